//! Build and publish workflows for override-aware sdists.

mod artifacts;
mod build;
mod collect;
mod publish;
mod sdist;

pub use build::{build_project, BuildRequest};
pub use collect::FileListTransform;
pub use publish::{publish_project, PublishRequest};
pub use sdist::SdistBuilder;
