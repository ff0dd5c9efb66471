// tests/publish_test.rs
use std::fs;
use std::path::PathBuf;

use conventional_release::action::{ActionContext, CommandFile};
use conventional_release::assets::resolve_assets;
use conventional_release::cli::{run_compute, run_publish, write_compute_results};
use conventional_release::config::Config;
use conventional_release::domain::CommitRecord;
use conventional_release::github::MockSource;
use conventional_release::handoff::ReleaseHandoff;
use conventional_release::ReleaseError;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn handoff(changelog: &[&str]) -> ReleaseHandoff {
    ReleaseHandoff {
        tag: "v1.3.0".to_string(),
        version: "1.3.0".to_string(),
        released: true,
        changelog: changelog.iter().map(|line| line.to_string()).collect(),
    }
}

fn asset_dir(files: &[(&str, &[u8])]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = files
        .iter()
        .map(|(name, data)| {
            let path = dir.path().join(name);
            fs::write(&path, data).unwrap();
            path
        })
        .collect();
    (dir, paths)
}

#[test]
fn test_release_body_lists_changelog() {
    let source = MockSource::new();
    let outcome = run_publish(&source, &handoff(&["feat: a", "fix: b"]), &[]).unwrap();

    let created = source.created_releases();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].tag, "v1.3.0");
    assert_eq!(created[0].body, "**Changelog:**\n* feat: a\n* fix: b\n");
    assert_eq!(outcome.release.map(|r| r.id), Some(created[0].id));
    assert!(outcome.assets.is_empty());
}

#[test]
fn test_assets_uploaded_in_order() {
    let (_dir, files) = asset_dir(&[("app.tar.gz", b"archive"), ("checksums.txt", b"sum")]);
    let source = MockSource::new();

    let outcome = run_publish(&source, &handoff(&["feat: a"]), &files).unwrap();

    let uploaded = source.uploaded_assets();
    let names: Vec<&str> = uploaded.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["app.tar.gz", "checksums.txt"]);
    assert_eq!(uploaded[0].size, 7);
    assert!(uploaded.iter().all(|a| a.release_id == source.created_releases()[0].id));
    assert_eq!(outcome.assets.len(), 2);
}

#[test]
fn test_upload_failure_aborts_remaining() {
    let (_dir, files) = asset_dir(&[("a.bin", b"a"), ("b.bin", b"b"), ("c.bin", b"c")]);
    let mut source = MockSource::new();
    source.fail_upload_at(1);

    let err = run_publish(&source, &handoff(&["fix: x"]), &files).unwrap_err();

    assert!(matches!(err, ReleaseError::Api(_)));
    assert_eq!(source.created_releases().len(), 1);
    let uploaded = source.uploaded_assets();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].name, "a.bin");
}

#[test]
fn test_invalid_handoff_creates_nothing() {
    let source = MockSource::new();
    let mut bad = handoff(&["feat: a"]);
    bad.version = "next".to_string();

    let err = run_publish(&source, &bad, &[]).unwrap_err();
    assert!(matches!(err, ReleaseError::Handoff(_)));
    assert!(source.created_releases().is_empty());
}

#[test]
fn test_resolved_globs_feed_publish() {
    let (dir, _files) = asset_dir(&[("one.zip", b"1"), ("two.zip", b"22"), ("notes.md", b"n")]);
    let pattern = format!("{}/*.zip", dir.path().display());

    let files = resolve_assets(&[pattern]).unwrap();
    let source = MockSource::new();
    run_publish(&source, &handoff(&["feat: a"]), &files).unwrap();

    let mut names: Vec<String> = source.uploaded_assets().into_iter().map(|a| a.name).collect();
    names.sort();
    assert_eq!(names, vec!["one.zip", "two.zip"]);
}

/// Parse a runner command file back into `STATE_*` variables
fn state_vars(contents: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    let mut lines = contents.lines();

    while let Some(line) = lines.next() {
        if let Some((key, delimiter)) = line.split_once("<<") {
            let mut value = Vec::new();
            for next in lines.by_ref() {
                if next == delimiter {
                    break;
                }
                value.push(next);
            }
            vars.push((format!("STATE_{}", key), value.join("\n")));
        } else if let Some((key, value)) = line.split_once('=') {
            vars.push((format!("STATE_{}", key), value.to_string()));
        }
    }

    vars
}

#[test]
fn test_compute_state_drives_publish() {
    let mut source = MockSource::new();
    source.add_commit(CommitRecord::new(
        "b",
        "feat: second\n\nwith body",
        Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap(),
    ));
    source.add_commit(CommitRecord::new(
        "a",
        "fix: first",
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    ));

    let outcome = run_compute(&source, &Config::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state");
    let mut outputs = CommandFile::new(Some(dir.path().join("output")));
    let mut state = CommandFile::new(Some(state_path.clone()));
    write_compute_results(&outcome, "v", &mut outputs, &mut state).unwrap();

    let ctx = ActionContext::from_vars(state_vars(&fs::read_to_string(&state_path).unwrap()));
    let restored = ReleaseHandoff::from_entries(|key| ctx.state(key)).unwrap();

    assert_eq!(restored, outcome.handoff());
    assert_eq!(restored.tag, "v0.1.0");

    run_publish(&source, &restored, &[]).unwrap();
    assert_eq!(
        source.created_releases()[0].body,
        "**Changelog:**\n* feat: second\n* fix: first\n"
    );
}
