use std::path::PathBuf;

use camino::Utf8PathBuf;

/// One file destined for the output archive.
///
/// Produced by the collection step and treated as opaque by the pipeline,
/// except that the rewriter matches on the logical archive path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedFile {
    /// Path the file occupies inside the archive, relative to the
    /// distribution root.
    pub archive_path: Utf8PathBuf,
    /// Where the file's bytes live on disk.
    pub source: PathBuf,
    pub project_root: PathBuf,
    pub source_root: PathBuf,
}

impl PackagedFile {
    #[must_use]
    pub fn new(
        archive_path: impl Into<Utf8PathBuf>,
        source: PathBuf,
        project_root: PathBuf,
        source_root: PathBuf,
    ) -> Self {
        Self {
            archive_path: archive_path.into(),
            source,
            project_root,
            source_root,
        }
    }
}
