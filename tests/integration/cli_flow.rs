//! End-to-end runs of the `stagehand` binary

use tempfile::TempDir;

use super::helpers::{stagehand, stdout};

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{needle}' not in output:\n{haystack}"))
}

#[test]
fn test_template_and_stage_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let output = stagehand(dir, &["init"]);
    assert!(output.status.success(), "init failed: {output:?}");
    assert!(dir.join(".stagehand").join("catalog.json").exists());

    let output = stagehand(dir, &["template", "create", "Wedding", "--category", "wedding"]);
    assert!(output.status.success(), "create failed: {output:?}");

    for args in [
        ["stage", "add", "Wedding", "Inquiry", "--phase", "lead"],
        ["stage", "add", "Wedding", "Proposal", "--phase", "lead"],
        ["stage", "add", "Wedding", "Shoot", "--phase", "production"],
    ] {
        let output = stagehand(dir, &args);
        assert!(output.status.success(), "{args:?} failed: {output:?}");
    }

    let output = stagehand(dir, &["stage", "move", "Wedding", "lead", "2", "1"]);
    assert!(output.status.success(), "move failed: {output:?}");

    let listing = stdout(&stagehand(dir, &["stage", "list", "Wedding"]));
    assert!(position(&listing, "Proposal") < position(&listing, "Inquiry"));
    assert!(position(&listing, "Inquiry") < position(&listing, "Shoot"));

    let progress = stdout(&stagehand(dir, &["progress", "Wedding", "--current", "Inquiry"]));
    assert!(progress.contains("67%"), "unexpected progress:\n{progress}");

    let output = stagehand(dir, &["template", "deactivate", "Wedding"]);
    assert!(output.status.success());
    let listing = stdout(&stagehand(dir, &["template", "list", "--category", "wedding"]));
    assert!(listing.contains("(no templates)"));
}

#[test]
fn test_commands_fail_without_init() {
    let temp_dir = TempDir::new().unwrap();

    let output = stagehand(temp_dir.path(), &["template", "list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stagehand init"), "unexpected stderr:\n{stderr}");
}

#[test]
fn test_invalid_order_is_rejected_by_parser() {
    let temp_dir = TempDir::new().unwrap();
    stagehand(temp_dir.path(), &["init"]);
    stagehand(temp_dir.path(), &["template", "create", "Wedding"]);

    let output = stagehand(
        temp_dir.path(),
        &["stage", "add", "Wedding", "Inquiry", "--phase", "lead", "--order", "0"],
    );
    assert!(!output.status.success());
}

#[test]
fn test_progress_decimals_follow_config() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    stagehand(dir, &["init"]);
    std::fs::write(
        dir.join(".stagehand").join("config.toml"),
        "[display]\npercent_decimals = 1\n",
    )
    .unwrap();

    stagehand(dir, &["template", "create", "Corporate"]);
    for name in ["Brief", "Venue", "Catering"] {
        stagehand(dir, &["stage", "add", "Corporate", name, "--phase", "lead"]);
    }

    let progress = stdout(&stagehand(dir, &["progress", "Corporate", "--current", "Brief"]));
    assert!(progress.contains("33.3%"), "unexpected progress:\n{progress}");
}
