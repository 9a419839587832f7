use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use toml_edit::{DocumentMut, Item};

use crate::overrides::Overrides;
use crate::rewrite::MANIFEST_FILENAME;

pub const MISSING_PROJECT_MESSAGE: &str = "No restamp project found.";

/// Declared project metadata, read once per invocation.
#[derive(Debug, Clone)]
pub struct ManifestSnapshot {
    pub root: PathBuf,
    pub name: String,
    pub version: Option<String>,
}

impl ManifestSnapshot {
    /// Reads `[project]` name and version from the manifest under `root`.
    ///
    /// A missing version is tolerated: the build falls back to `0.0.0`
    /// unless an override supplies one. A missing name is an error since
    /// the artifact cannot be named without it.
    ///
    /// # Errors
    /// Returns an error when the manifest is absent, unparsable, or has no
    /// `[project].name`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILENAME);
        ensure_pyproject_exists(&path)?;
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("parsing {}", path.display()))?;
        let project = doc
            .get("project")
            .and_then(Item::as_table)
            .ok_or_else(|| anyhow!("pyproject.toml has no [project] table"))?;
        let name = project
            .get("name")
            .and_then(Item::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| anyhow!("pyproject.toml is missing [project].name"))?;
        let version = project
            .get("version")
            .and_then(Item::as_str)
            .map(ToOwned::to_owned);
        Ok(Self {
            root: root.to_path_buf(),
            name,
            version,
        })
    }

    /// Project name after applying any override.
    #[must_use]
    pub fn effective_name(&self, overrides: &Overrides) -> String {
        overrides.name.clone().unwrap_or_else(|| self.name.clone())
    }

    /// Project version after applying any override.
    #[must_use]
    pub fn effective_version(&self, overrides: &Overrides) -> String {
        overrides
            .version
            .clone()
            .or_else(|| self.version.clone())
            .unwrap_or_else(|| "0.0.0".to_string())
    }
}

/// # Errors
/// Returns an error when `path` is not an existing file.
pub fn ensure_pyproject_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(anyhow!("pyproject.toml not found at {}", path.display()))
    }
}

/// Walks up from `start` to the nearest directory containing a manifest.
#[must_use]
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(MANIFEST_FILENAME).is_file() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Resolves the project root for the current working directory.
///
/// # Errors
/// Returns an error when no manifest is found in the directory or any of
/// its ancestors.
pub fn current_project_root() -> Result<PathBuf> {
    let cwd = env::current_dir().context("inspecting working directory")?;
    discover_project_root(&cwd).ok_or_else(|| anyhow!(MISSING_PROJECT_MESSAGE))
}
