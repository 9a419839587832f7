use assert_cmd::cargo::cargo_bin_cmd;

mod common;

use common::{parse_json, prepare_fixture};

#[test]
fn publish_without_artifacts_is_a_user_error() {
    let (_tmp, project) = prepare_fixture("publish-empty");

    let assert = cargo_bin_cmd!("restamp")
        .current_dir(&project)
        .args(["--json", "publish"])
        .assert()
        .failure()
        .code(1);

    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "user-error");
    assert_eq!(payload["details"]["reason"], "missing_artifact");
    assert_eq!(payload["details"]["expected"], "sample_app-0.1.0.tar.gz");
}

#[test]
fn publish_previews_a_built_artifact() {
    let (_tmp, project) = prepare_fixture("publish-preview");

    cargo_bin_cmd!("restamp")
        .current_dir(&project)
        .args(["build"])
        .assert()
        .success();

    let assert = cargo_bin_cmd!("restamp")
        .current_dir(&project)
        .args(["--json", "publish"])
        .assert()
        .success();

    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["uploaded"], false);
    assert_eq!(
        payload["details"]["artifacts"][0]["path"],
        "dist/sample_app-0.1.0.tar.gz"
    );
}

#[test]
fn publish_and_build_agree_on_overridden_names() {
    let (_tmp, project) = prepare_fixture("publish-overrides");

    cargo_bin_cmd!("restamp")
        .current_dir(&project)
        .args(["build", "--override-version", "9.9.9"])
        .assert()
        .success();

    cargo_bin_cmd!("restamp")
        .current_dir(&project)
        .args(["publish", "--override-version", "9.9.9"])
        .assert()
        .success();

    // Without the override the declared version has no artifact yet.
    cargo_bin_cmd!("restamp")
        .current_dir(&project)
        .args(["publish"])
        .assert()
        .failure()
        .code(1);
}
