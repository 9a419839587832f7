use std::path::Path;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use ignore::WalkBuilder;
use tracing::warn;

use restamp_domain::PackagedFile;

/// Transforms the collected file list before archiving.
///
/// Registered transforms run in registration order; each receives the
/// previous list and returns its replacement. The override rewriter is one
/// such transform.
pub trait FileListTransform {
    /// # Errors
    /// A failing transform aborts the build.
    fn transform(&self, files: Vec<PackagedFile>) -> Result<Vec<PackagedFile>>;
}

/// Collects the project files to package, gitignore-aware and in a
/// deterministic order.
pub(crate) fn collect_project_files(project_root: &Path) -> Result<Vec<PackagedFile>> {
    let mut walker = WalkBuilder::new(project_root);
    walker
        .git_ignore(true)
        .git_exclude(true)
        .parents(true)
        .hidden(false)
        .ignore(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !should_skip(entry.path()));

    let mut files = Vec::new();
    for entry in walker.build() {
        let entry = entry.context("walking project tree for packaging")?;
        let path = entry.path();
        if path == project_root || !entry.file_type().is_some_and(|ty| ty.is_file()) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(project_root) else {
            continue;
        };
        let Ok(archive_path) = Utf8PathBuf::from_path_buf(relative.to_path_buf()) else {
            warn!(path = %path.display(), "skipping non-UTF-8 path");
            continue;
        };
        files.push(PackagedFile::new(
            archive_path,
            path.to_path_buf(),
            project_root.to_path_buf(),
            project_root.to_path_buf(),
        ));
    }
    Ok(files)
}

fn should_skip(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    matches!(
        name,
        ".git"
            | "__pycache__"
            | "build"
            | "dist"
            | ".mypy_cache"
            | ".pytest_cache"
            | ".nox"
            | ".tox"
            | ".venv"
            | "venv"
            | ".ruff_cache"
    ) || name.ends_with(".pyc")
}
