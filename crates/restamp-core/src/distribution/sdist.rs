use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, HeaderMode};
use tracing::debug;

use super::collect::{collect_project_files, FileListTransform};

/// Writes `{name}-{version}.tar.gz` from the collected project files.
///
/// Name and version are the effective values for this build, so an override
/// changes the archive filename and its internal root directory along with
/// the patched manifest.
pub struct SdistBuilder {
    project_root: PathBuf,
    dist_name: String,
    version: String,
    transforms: Vec<Box<dyn FileListTransform>>,
}

impl SdistBuilder {
    #[must_use]
    pub fn new(project_root: PathBuf, name: &str, version: &str) -> Self {
        Self {
            project_root,
            dist_name: normalize_dist_name(name),
            version: version.to_string(),
            transforms: Vec::new(),
        }
    }

    /// Registers a hook over the collected file list, run before archiving.
    pub fn register_transform(&mut self, transform: Box<dyn FileListTransform>) {
        self.transforms.push(transform);
    }

    #[must_use]
    pub fn archive_name(&self) -> String {
        format!("{}-{}.tar.gz", self.dist_name, self.version)
    }

    /// Collects, transforms, and archives the project files into `out_dir`.
    ///
    /// # Errors
    /// Returns an error when collection, a registered transform, or writing
    /// the archive fails.
    pub fn build(&self, out_dir: &Path) -> Result<PathBuf> {
        let mut files = collect_project_files(&self.project_root)?;
        for transform in &self.transforms {
            files = transform.transform(files)?;
        }

        let out_path = out_dir.join(self.archive_name());
        let file = File::create(&out_path)
            .with_context(|| format!("creating sdist at {}", out_path.display()))?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);
        builder.mode(HeaderMode::Deterministic);

        let prefix = format!("{}-{}", self.dist_name, self.version);
        for entry in &files {
            let archive_path = Path::new(&prefix).join(entry.archive_path.as_std_path());
            let mut source = File::open(&entry.source)
                .with_context(|| format!("reading {} for sdist", entry.source.display()))?;
            builder
                .append_file(&archive_path, &mut source)
                .with_context(|| format!("staging {} into sdist", entry.archive_path))?;
        }

        let encoder = builder.into_inner().context("finalizing sdist archive")?;
        encoder.finish().context("flushing sdist archive")?;
        debug!(archive = %out_path.display(), files = files.len(), "wrote sdist");
        Ok(out_path)
    }
}

pub(crate) fn normalize_dist_name(name: &str) -> String {
    name.replace('-', "_")
}
