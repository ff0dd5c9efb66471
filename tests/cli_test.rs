// tests/cli_test.rs
use std::fs;
use std::process::Command;

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_conventional-release"));
    for (key, _) in std::env::vars() {
        if key.starts_with("GITHUB_") || key.starts_with("INPUT_") || key.starts_with("STATE_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let output = binary().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("conventional-release"));
    assert!(stdout.contains("compute"));
    assert!(stdout.contains("publish"));
}

#[test]
fn test_publish_skips_when_not_released() {
    let dir = tempfile::tempdir().unwrap();

    let output = binary()
        .current_dir(dir.path())
        .arg("publish")
        .env("STATE_tag", "v1.2.3")
        .env("STATE_version", "1.2.3")
        .env("STATE_released", "false")
        .env("STATE_changelog", "[]")
        .output()
        .unwrap();

    assert!(output.status.success());
}

#[test]
fn test_publish_without_state_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = binary().current_dir(dir.path()).arg("publish").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("missing state entry"));
}

#[test]
fn test_compute_requires_repository() {
    let dir = tempfile::tempdir().unwrap();

    let output = binary().current_dir(dir.path()).arg("compute").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("GITHUB_REPOSITORY"));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("release.toml");
    fs::write(&config, "[version]\ninit_version = \"one\"\n").unwrap();

    let output = binary()
        .current_dir(dir.path())
        .args(["compute", "--config"])
        .arg(&config)
        .env("GITHUB_REPOSITORY", "octo/repo")
        .env("GITHUB_TOKEN", "token")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
