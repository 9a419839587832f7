//! Manifest rewriting for override-aware builds.
//!
//! The file list handed to the archive writer passes through here when at
//! least one override is active: the `pyproject.toml` entry (if present) is
//! re-pointed at a transient copy whose `name`/`version` lines carry the
//! override values. The manifest on disk is never mutated.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use tracing::debug;

use crate::entry::PackagedFile;
use crate::overrides::Overrides;

/// Logical archive path of the project manifest.
pub const MANIFEST_FILENAME: &str = "pyproject.toml";

fn version_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^version\s*=.*$").expect("hard-coded pattern"))
}

fn name_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^name\s*=.*$").expect("hard-coded pattern"))
}

/// Replaces the manifest entry in `entries` with a transient patched copy.
///
/// All other entries pass through unmodified and in their original order;
/// with no manifest entry present the whole list passes through untouched.
/// Only the first line matching each field is rewritten, and a field with no
/// matching line is left as-is (nothing is inserted). Override values are
/// substituted literally, without validation or escaping.
///
/// # Errors
/// Fails when the manifest or its transient copy cannot be read or written.
pub fn rewrite_file_list(
    entries: Vec<PackagedFile>,
    overrides: &Overrides,
) -> Result<Vec<PackagedFile>> {
    entries
        .into_iter()
        .map(|entry| {
            if entry.archive_path == MANIFEST_FILENAME {
                patch_manifest_entry(&entry, overrides)
            } else {
                Ok(entry)
            }
        })
        .collect()
}

fn patch_manifest_entry(entry: &PackagedFile, overrides: &Overrides) -> Result<PackagedFile> {
    let text = fs::read_to_string(&entry.source)
        .with_context(|| format!("reading manifest at {}", entry.source.display()))?;
    let patched = apply_overrides(&text, overrides);
    let transient = write_transient(&patched)?;
    debug!(
        manifest = %entry.source.display(),
        transient = %transient.display(),
        "staged patched manifest for archive"
    );
    Ok(PackagedFile {
        archive_path: MANIFEST_FILENAME.into(),
        source: transient,
        project_root: entry.project_root.clone(),
        source_root: entry.source_root.clone(),
    })
}

fn apply_overrides(text: &str, overrides: &Overrides) -> String {
    let mut patched = text.to_string();
    if let Some(version) = overrides.version.as_deref() {
        let line = format!("version=\"{version}\"");
        patched = version_line()
            .replace(&patched, NoExpand(&line))
            .into_owned();
    }
    if let Some(name) = overrides.name.as_deref() {
        let line = format!("name=\"{name}\"");
        patched = name_line().replace(&patched, NoExpand(&line)).into_owned();
    }
    patched
}

// Ownership of the transient file passes to the archive writer; it is not
// deleted here.
fn write_transient(text: &str) -> Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix(".restamp-manifest-")
        .suffix(".toml")
        .tempfile()
        .context("creating transient manifest file")?;
    file.write_all(text.as_bytes())
        .context("writing transient manifest")?;
    let (_, path) = file.keep().context("persisting transient manifest")?;
    Ok(path)
}
