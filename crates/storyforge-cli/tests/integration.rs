use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn storyforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("storyforge").unwrap();
    cmd.env("STORYFORGE_CONFIG", dir.path().join("config.yaml"))
        // Launch resolution on Windows needs these; harmless elsewhere.
        .env("COPILOT_NODE_PATH", "node")
        .env("COPILOT_SCRIPT_PATH", "copilot.js");
    cmd
}

fn seed_tracker(dir: &TempDir, organization_url: &str) {
    storyforge(dir)
        .args(["config", "set", "tracker.organization_url", organization_url])
        .assert()
        .success();
    storyforge(dir)
        .args(["config", "set", "tracker.pat", "pat"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// storyforge config
// ---------------------------------------------------------------------------

#[test]
fn config_set_then_show_redacts_secrets() {
    let dir = TempDir::new().unwrap();
    seed_tracker(&dir, "https://dev.azure.com/acme");

    storyforge(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://dev.azure.com/acme"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("pat: pat").not());
}

#[test]
fn config_show_json_emits_the_settings_object() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir)
        .args(["config", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tracker\""))
        .stdout(predicate::str::contains("\"wiki\""));
}

#[test]
fn config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir)
        .args(["config", "set", "tracker.nope", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown settings key"));
}

#[test]
fn config_path_prints_the_override() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
}

// ---------------------------------------------------------------------------
// storyforge testcases / stories (settings guards)
// ---------------------------------------------------------------------------

#[test]
fn testcases_without_tracker_settings_fails_with_guidance() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir)
        .args(["testcases", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tracker settings are incomplete"));
}

#[test]
fn stories_without_wiki_settings_fails_with_guidance() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir)
        .args(["stories", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wiki settings are incomplete"));
}

// ---------------------------------------------------------------------------
// storyforge push
// ---------------------------------------------------------------------------

#[test]
fn push_with_a_missing_stories_file_fails() {
    let dir = TempDir::new().unwrap();
    seed_tracker(&dir, "https://dev.azure.com/acme");

    let missing = dir.path().join("none.json");
    storyforge(&dir)
        .args(["push", "42", "--file", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load stories"));
}

#[test]
fn push_with_an_empty_stories_file_fails() {
    let dir = TempDir::new().unwrap();
    seed_tracker(&dir, "https://dev.azure.com/acme");

    let file = dir.path().join("stories.json");
    std::fs::write(&file, "[]").unwrap();
    storyforge(&dir)
        .args(["push", "42", "--file", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("contains no stories"));
}

#[test]
fn push_reports_per_story_failures_without_aborting() {
    let dir = TempDir::new().unwrap();
    // Point the tracker at a port nothing listens on; every write fails
    // but the command still reports each story and exits cleanly.
    seed_tracker(&dir, "http://127.0.0.1:9");

    let file = dir.path().join("stories.json");
    std::fs::write(
        &file,
        r#"[
          {"title":"A","description":"d","acceptanceCriteria":"ac","notes":""},
          {"title":"B","description":"d","acceptanceCriteria":"ac","notes":""}
        ]"#,
    )
    .unwrap();

    storyforge(&dir)
        .args(["push", "42", "--file", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("story 1: failed"))
        .stdout(predicate::str::contains("story 2: failed"))
        .stdout(predicate::str::contains("0 created, 2 failed"));
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

#[test]
fn help_lists_the_subcommands() {
    Command::cargo_bin("storyforge")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("testcases"))
        .stdout(predicate::str::contains("stories"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("auth"));
}
