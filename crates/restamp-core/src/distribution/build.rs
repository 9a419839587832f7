use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use restamp_domain::{rewrite_file_list, ManifestSnapshot, Overrides, PackagedFile};

use crate::context::CommandContext;
use crate::outcome::{
    is_missing_project_error, manifest_error_outcome, missing_project_outcome, ExecutionOutcome,
};

use super::artifacts::{format_bytes, relative_path_str, summarize_artifact};
use super::collect::FileListTransform;
use super::sdist::SdistBuilder;

#[derive(Clone, Debug, Default)]
pub struct BuildRequest {
    pub override_name: Option<String>,
    pub override_version: Option<String>,
    pub out: Option<PathBuf>,
    pub dry_run: bool,
}

struct OverrideRewrite {
    overrides: Overrides,
}

impl FileListTransform for OverrideRewrite {
    fn transform(&self, files: Vec<PackagedFile>) -> Result<Vec<PackagedFile>> {
        rewrite_file_list(files, &self.overrides)
    }
}

/// Builds the project sdist, applying any name/version overrides.
///
/// # Errors
/// Returns an error when collection or archiving fails; missing or invalid
/// manifests surface as user-error outcomes instead.
pub fn build_project(ctx: &CommandContext, request: &BuildRequest) -> Result<ExecutionOutcome> {
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

    let overrides = resolve_overrides(ctx, request);
    log_transitions(&snapshot, &overrides);
    let name = snapshot.effective_name(&overrides);
    let version = snapshot.effective_version(&overrides);
    let out_dir = resolve_output_dir(ctx, &root, request.out.as_ref());

    let mut builder = SdistBuilder::new(root.clone(), &name, &version);
    if overrides.is_active() {
        builder.register_transform(Box::new(OverrideRewrite {
            overrides: overrides.clone(),
        }));
    }

    if request.dry_run {
        let message = format!(
            "restamp build: dry-run (artifact={}, out={})",
            builder.archive_name(),
            relative_path_str(&out_dir, &root),
        );
        return Ok(ExecutionOutcome::success(
            message,
            json!({
                "artifact": builder.archive_name(),
                "out_dir": relative_path_str(&out_dir, &root),
                "overrides": overrides_details(&overrides),
                "dry_run": true,
            }),
        ));
    }

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory at {}", out_dir.display()))?;
    let artifact_path = builder.build(&out_dir)?;
    let summary = summarize_artifact(&artifact_path, &root)?;

    let sha_short: String = summary.sha256.chars().take(12).collect();
    let message = format!(
        "restamp build: wrote {} ({}, sha256={}…)",
        summary.path,
        format_bytes(summary.bytes),
        sha_short
    );
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "artifacts": [summary],
            "out_dir": relative_path_str(&out_dir, &root),
            "overrides": overrides_details(&overrides),
            "dry_run": false,
        }),
    ))
}

pub(crate) fn resolve_overrides(ctx: &CommandContext, request: &BuildRequest) -> Overrides {
    let env = ctx.config().overrides();
    Overrides::resolve(
        request.override_name.as_deref(),
        request.override_version.as_deref(),
        env.name.as_deref(),
        env.version.as_deref(),
    )
}

fn log_transitions(snapshot: &ManifestSnapshot, overrides: &Overrides) {
    if let Some(new_version) = overrides.version.as_deref() {
        let old = snapshot.version.as_deref().unwrap_or("(unset)");
        info!("overriding project version from {old} to {new_version}");
    }
    if let Some(new_name) = overrides.name.as_deref() {
        info!("overriding project name from {} to {new_name}", snapshot.name);
    }
}

fn overrides_details(overrides: &Overrides) -> serde_json::Value {
    json!({
        "name": overrides.name,
        "version": overrides.version,
    })
}

pub(crate) fn resolve_output_dir(
    ctx: &CommandContext,
    root: &Path,
    out: Option<&PathBuf>,
) -> PathBuf {
    match out {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => root.join(path),
        None => root.join(&ctx.config().output().dist_dir),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use restamp_domain::{NAME_ENV_VAR, VERSION_ENV_VAR};
    use tar::Archive;

    use crate::config::{EnvSnapshot, GlobalOptions};
    use crate::outcome::CommandStatus;

    use super::*;

    fn fixture_project(temp: &tempfile::TempDir) -> PathBuf {
        let root = temp.path().join("proj");
        fs::create_dir_all(root.join("src/demo")).expect("src");
        fs::write(
            root.join("pyproject.toml"),
            "[project]\nname = \"demo\"\nversion = \"0.1.0\"\n",
        )
        .expect("manifest");
        fs::write(root.join("src/demo/__init__.py"), "").expect("module");
        root
    }

    fn archived_manifest(archive: &Path) -> String {
        let file = fs::File::open(archive).expect("open archive");
        let mut tar = Archive::new(GzDecoder::new(file));
        for entry in tar.entries().expect("entries") {
            let mut entry = entry.expect("entry");
            let path = entry.path().expect("path").display().to_string();
            if path.ends_with("pyproject.toml") {
                let mut text = String::new();
                entry.read_to_string(&mut text).expect("read manifest");
                return text;
            }
        }
        panic!("archive has no pyproject.toml");
    }

    #[test]
    fn dry_run_reports_the_plan_without_writing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = fixture_project(&temp);
        let global = GlobalOptions::default();
        let ctx = CommandContext::testing(&global, EnvSnapshot::testing(&[]), root.clone());

        let request = BuildRequest {
            dry_run: true,
            ..BuildRequest::default()
        };
        let outcome = build_project(&ctx, &request).expect("build");
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.details["artifact"], "demo-0.1.0.tar.gz");
        assert!(!root.join("dist").exists());
    }

    #[test]
    fn version_override_renames_artifact_and_patches_manifest() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = fixture_project(&temp);
        let global = GlobalOptions::default();
        let ctx = CommandContext::testing(&global, EnvSnapshot::testing(&[]), root.clone());

        let request = BuildRequest {
            override_version: Some("9.9.9".to_string()),
            ..BuildRequest::default()
        };
        let outcome = build_project(&ctx, &request).expect("build");
        assert_eq!(outcome.status, CommandStatus::Ok);

        let artifact = root.join("dist").join("demo-9.9.9.tar.gz");
        assert!(artifact.is_file(), "expected {artifact:?}");

        let manifest = archived_manifest(&artifact);
        assert!(manifest.contains("version=\"9.9.9\""));
        assert!(manifest.contains("name = \"demo\""));

        let on_disk = fs::read_to_string(root.join("pyproject.toml")).expect("read manifest");
        assert!(on_disk.contains("version = \"0.1.0\""));
    }

    #[test]
    fn environment_overrides_apply_when_flags_are_absent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = fixture_project(&temp);
        let global = GlobalOptions::default();
        let env = EnvSnapshot::testing(&[(NAME_ENV_VAR, "demo-nightly"), (VERSION_ENV_VAR, "7.7.7")]);
        let ctx = CommandContext::testing(&global, env, root.clone());

        let outcome = build_project(&ctx, &BuildRequest::default()).expect("build");
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert!(root.join("dist").join("demo_nightly-7.7.7.tar.gz").is_file());
    }

    #[test]
    fn flags_beat_environment_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = fixture_project(&temp);
        let global = GlobalOptions::default();
        let env = EnvSnapshot::testing(&[(VERSION_ENV_VAR, "7.7.7")]);
        let ctx = CommandContext::testing(&global, env, root.clone());

        let request = BuildRequest {
            override_version: Some("1.2.3".to_string()),
            ..BuildRequest::default()
        };
        build_project(&ctx, &request).expect("build");
        assert!(root.join("dist").join("demo-1.2.3.tar.gz").is_file());
    }

    #[test]
    fn unparsable_manifest_is_a_user_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("proj");
        fs::create_dir_all(&root).expect("root");
        fs::write(root.join("pyproject.toml"), "not [valid toml").expect("manifest");
        let global = GlobalOptions::default();
        let ctx = CommandContext::testing(&global, EnvSnapshot::testing(&[]), root);

        let outcome = build_project(&ctx, &BuildRequest::default()).expect("build");
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "invalid_manifest");
    }
}
