#![deny(clippy::all, warnings)]

mod config;
mod context;
mod distribution;
mod outcome;

pub use config::{Config, GlobalOptions, OutputConfig, OverrideConfig};
pub use context::{CommandContext, CommandGroup, CommandInfo};
pub use distribution::{
    build_project, publish_project, BuildRequest, FileListTransform, PublishRequest, SdistBuilder,
};
pub use outcome::{
    format_status_message, is_missing_project_error, manifest_error_outcome,
    missing_project_outcome, to_json_response, CommandStatus, ExecutionOutcome,
    MISSING_PROJECT_HINT, MISSING_PROJECT_MESSAGE,
};
