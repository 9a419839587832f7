use anyhow::Result;
use serde_json::json;

use restamp_domain::ManifestSnapshot;

use crate::context::CommandContext;
use crate::outcome::{
    is_missing_project_error, manifest_error_outcome, missing_project_outcome, ExecutionOutcome,
};

use super::artifacts::{format_bytes, relative_path_str, summarize_artifact};
use super::build::{resolve_overrides, BuildRequest};
use super::sdist::normalize_dist_name;

#[derive(Clone, Debug, Default)]
pub struct PublishRequest {
    pub override_name: Option<String>,
    pub override_version: Option<String>,
}

/// Reports what a release would ship for the effective name/version.
///
/// Uploads are out of scope; the command locates the matching artifact in the
/// dist directory and previews it, or points the user at `restamp build`.
///
/// # Errors
/// Returns an error when the artifact cannot be inspected.
pub fn publish_project(ctx: &CommandContext, request: &PublishRequest) -> Result<ExecutionOutcome> {
    let root = match ctx.project_root() {
        Ok(root) => root,
        Err(err) if is_missing_project_error(&err) => return Ok(missing_project_outcome()),
        Err(err) => return Err(err),
    };
    let snapshot = match ManifestSnapshot::load(&root) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            if let Some(outcome) = manifest_error_outcome(&err) {
                return Ok(outcome);
            }
            return Err(err);
        }
    };

    let build_request = BuildRequest {
        override_name: request.override_name.clone(),
        override_version: request.override_version.clone(),
        ..BuildRequest::default()
    };
    let overrides = resolve_overrides(ctx, &build_request);
    let name = snapshot.effective_name(&overrides);
    let version = snapshot.effective_version(&overrides);

    let dist_dir = root.join(&ctx.config().output().dist_dir);
    let expected = format!("{}-{}.tar.gz", normalize_dist_name(&name), version);
    let artifact = dist_dir.join(&expected);
    if !artifact.is_file() {
        return Ok(ExecutionOutcome::user_error(
            format!(
                "restamp publish: no artifact {expected} in {}",
                relative_path_str(&dist_dir, &root)
            ),
            json!({
                "reason": "missing_artifact",
                "expected": expected,
                "dist_dir": relative_path_str(&dist_dir, &root),
                "hint": "Run `restamp build` with the same overrides first.",
            }),
        ));
    }

    let summary = summarize_artifact(&artifact, &root)?;
    let message = format!(
        "restamp publish: would upload {} ({})",
        summary.path,
        format_bytes(summary.bytes)
    );
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "artifacts": [summary],
            "uploaded": false,
            "overrides": {
                "name": overrides.name,
                "version": overrides.version,
            },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crate::config::{EnvSnapshot, GlobalOptions};
    use crate::outcome::CommandStatus;

    use super::*;

    fn fixture_project(temp: &tempfile::TempDir) -> PathBuf {
        let root = temp.path().join("proj");
        fs::create_dir_all(&root).expect("root");
        fs::write(
            root.join("pyproject.toml"),
            "[project]\nname = \"demo\"\nversion = \"0.1.0\"\n",
        )
        .expect("manifest");
        root
    }

    #[test]
    fn missing_artifact_is_a_user_error_with_hint() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = fixture_project(&temp);
        let global = GlobalOptions::default();
        let ctx = CommandContext::testing(&global, EnvSnapshot::testing(&[]), root);

        let outcome = publish_project(&ctx, &PublishRequest::default()).expect("publish");
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "missing_artifact");
        assert_eq!(outcome.details["expected"], "demo-0.1.0.tar.gz");
    }

    #[test]
    fn existing_artifact_is_previewed_not_uploaded() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = fixture_project(&temp);
        fs::create_dir_all(root.join("dist")).expect("dist");
        fs::write(root.join("dist/demo-0.1.0.tar.gz"), b"archive").expect("artifact");
        let global = GlobalOptions::default();
        let ctx = CommandContext::testing(&global, EnvSnapshot::testing(&[]), root);

        let outcome = publish_project(&ctx, &PublishRequest::default()).expect("publish");
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.details["uploaded"], false);
        assert_eq!(
            outcome.details["artifacts"][0]["path"],
            "dist/demo-0.1.0.tar.gz"
        );
    }

    #[test]
    fn overrides_change_the_expected_artifact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = fixture_project(&temp);
        fs::create_dir_all(root.join("dist")).expect("dist");
        fs::write(root.join("dist/demo-9.9.9.tar.gz"), b"archive").expect("artifact");
        let global = GlobalOptions::default();
        let ctx = CommandContext::testing(&global, EnvSnapshot::testing(&[]), root);

        let request = PublishRequest {
            override_version: Some("9.9.9".to_string()),
            ..PublishRequest::default()
        };
        let outcome = publish_project(&ctx, &request).expect("publish");
        assert_eq!(outcome.status, CommandStatus::Ok);
    }
}
