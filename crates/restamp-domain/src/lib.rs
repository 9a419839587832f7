#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod entry;
pub mod manifest;
pub mod overrides;
pub mod rewrite;

pub use entry::PackagedFile;
pub use manifest::{
    current_project_root, discover_project_root, ensure_pyproject_exists, ManifestSnapshot,
    MISSING_PROJECT_MESSAGE,
};
pub use overrides::{Overrides, NAME_ENV_VAR, VERSION_ENV_VAR};
pub use rewrite::{rewrite_file_list, MANIFEST_FILENAME};
