//! Compute and publish workflows.
//!
//! Both phases take the release source as an explicit dependency so they can
//! run against the GitHub client or an in-memory source.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::action::CommandFile;
use crate::analyzer::{VersionPlan, VersionPlanner};
use crate::assets::asset_name;
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{select_current_release, CommitRecord, Release, ReleaseAsset, TagPolicy};
use crate::error::Result;
use crate::github::ReleaseSource;
use crate::handoff::ReleaseHandoff;

/// Result of the compute phase
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeOutcome {
    pub plan: VersionPlan,
    pub prior_release: Option<Release>,
    pub prior_commit_id: Option<String>,
    pub warnings: Vec<BoundaryWarning>,
}

impl ComputeOutcome {
    pub fn handoff(&self) -> ReleaseHandoff {
        ReleaseHandoff::from(&self.plan)
    }
}

/// Result of the publish phase
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    /// `None` when the handoff carried no new version
    pub release: Option<Release>,
    pub assets: Vec<ReleaseAsset>,
}

/// Run the compute phase: locate the previous release and its boundary
/// commit, list the newer commits and plan the next version.
pub fn run_compute<S: ReleaseSource + ?Sized>(source: &S, config: &Config) -> Result<ComputeOutcome> {
    let policy = config.tag_policy()?;
    let planner = VersionPlanner::new(
        config.rule_set()?,
        config.version.init_version.clone(),
        config.version.tag_prefix.clone(),
    );

    debug!(
        init_version = %config.version.init_version,
        tag_prefix = %config.version.tag_prefix,
        "main: inputs"
    );

    let mut warnings = Vec::new();
    let prior_release = find_prior_release(source, config, &policy, &mut warnings)?;

    debug!(
        "main: found latest release tag: {:?}, created at: {:?}",
        prior_release.as_ref().map(|r| &r.tag_name),
        prior_release.as_ref().map(|r| r.created_at)
    );

    let boundary = match &prior_release {
        Some(release) => find_release_commit(source, release, &mut warnings)?,
        None => None,
    };

    let since = boundary.as_ref().map(|commit| commit.authored_at);
    debug!("main: commit date: {:?}", since);

    let commits = source.list_commits_since(since)?;
    debug!("main: found {} commits since {:?}", commits.len(), since);

    let prior_commit_id = boundary.map(|commit| commit.id);
    if let (Some(release), Some(commit_id)) = (&prior_release, &prior_commit_id) {
        if !commits.iter().any(|commit| &commit.id == commit_id) {
            warnings.push(BoundaryWarning::BoundaryCommitNotInHistory {
                tag: release.tag_name.clone(),
                commit_id: commit_id.clone(),
            });
        }
    }

    let plan = planner.plan(prior_release.as_ref(), prior_commit_id.as_deref(), &commits)?;

    if let Some(release) = &prior_release {
        if plan.already_released > 0 {
            warnings.push(BoundaryWarning::CommitsBeforeRelease {
                tag: release.tag_name.clone(),
                count: plan.already_released,
            });
        }
    }

    if plan.changelog.is_empty() {
        warnings.push(BoundaryWarning::NoNewCommits {
            latest_tag: prior_release.as_ref().map(|r| r.tag_name.clone()),
        });
    }

    info!(
        "last version: {}, tag: {}",
        plan.previous_version,
        plan.previous_version.to_tag(planner.tag_prefix())
    );

    if plan.released {
        info!("new version: {}, tag: {}", plan.next_version, plan.tag);
    } else {
        info!("no new version");
    }

    Ok(ComputeOutcome {
        plan,
        prior_release,
        prior_commit_id,
        warnings,
    })
}

fn find_prior_release<S: ReleaseSource + ?Sized>(
    source: &S,
    config: &Config,
    policy: &TagPolicy,
    warnings: &mut Vec<BoundaryWarning>,
) -> Result<Option<Release>> {
    if config.release.latest_release_shortcut {
        match source.latest_release() {
            Some(release) if policy.matches(&release.tag_name) => return Ok(Some(release)),
            _ => warnings.push(BoundaryWarning::LatestReleaseUnavailable),
        }
    }

    let releases = source.list_releases()?;
    debug!("main: found {} releases", releases.len());

    let excluded = releases
        .iter()
        .filter(|release| !policy.matches(&release.tag_name))
        .count();
    if excluded > 0 {
        warnings.push(BoundaryWarning::ReleasesExcluded {
            count: excluded,
            prefix: policy.prefix().to_string(),
            mode: policy.mode(),
        });
    }

    Ok(select_current_release(&releases, policy).cloned())
}

fn find_release_commit<S: ReleaseSource + ?Sized>(
    source: &S,
    release: &Release,
    warnings: &mut Vec<BoundaryWarning>,
) -> Result<Option<CommitRecord>> {
    let tags = source.list_tags()?;

    let Some(tag) = tags.iter().find(|tag| tag.name == release.tag_name) else {
        warnings.push(BoundaryWarning::ReleaseTagNotFound {
            tag: release.tag_name.clone(),
        });
        return Ok(None);
    };

    let commit = source.get_commit(&tag.commit_id)?;
    debug!("main: found commit sha: {}", commit.id);

    Ok(Some(commit))
}

/// Write compute results as pipeline outputs and publish-phase state
pub fn write_compute_results(
    outcome: &ComputeOutcome,
    tag_prefix: &str,
    outputs: &mut CommandFile,
    state: &mut CommandFile,
) -> Result<()> {
    let plan = &outcome.plan;
    let version = plan.next_version;

    let entries = [
        ("tag", plan.tag.clone()),
        ("version", version.to_string()),
        ("version-major", version.major.to_string()),
        ("version-minor", version.minor.to_string()),
        ("version-patch", version.patch.to_string()),
        ("tag-prefix", tag_prefix.to_string()),
        ("released", plan.released.to_string()),
    ];

    for (key, value) in &entries {
        outputs.write(key, value)?;
    }
    debug!(?entries, "main: outputs written");

    let handoff = outcome.handoff();
    for (key, value) in handoff.to_entries()? {
        state.write(key, &value)?;
    }

    debug!(
        "main: state set tag: {}, version: {}, released: {}, changelog count: {}",
        handoff.tag,
        handoff.version,
        handoff.released,
        handoff.changelog.len()
    );

    Ok(())
}

/// Run the publish phase: create the release described by `handoff` and
/// upload `asset_files` to it, in order.
///
/// Nothing is created when the handoff carries no new version. The first
/// failed upload aborts the remaining ones; the created release is kept.
pub fn run_publish<S: ReleaseSource + ?Sized>(
    source: &S,
    handoff: &ReleaseHandoff,
    asset_files: &[PathBuf],
) -> Result<PublishOutcome> {
    handoff.validate()?;

    if !handoff.released {
        info!("release: skip, no new version");
        return Ok(PublishOutcome {
            release: None,
            assets: Vec::new(),
        });
    }

    info!(
        "release: creating for version: {}, tag: {}",
        handoff.version, handoff.tag
    );

    let release = source.create_release(&handoff.tag, &handoff.release_body())?;
    info!("release: created id: {}", release.id);

    if !asset_files.is_empty() {
        info!("release asset: found {} to upload", asset_files.len());
    }

    let mut assets = Vec::new();
    for file in asset_files {
        match upload_file(source, &release, file) {
            Ok(asset) => assets.push(asset),
            Err(e) => {
                warn!(
                    "release asset: upload of {} failed after {} of {} assets: {:?}",
                    file.display(),
                    assets.len(),
                    asset_files.len(),
                    assets.iter().map(|a| a.name.as_str()).collect::<Vec<_>>()
                );
                return Err(e);
            }
        }
    }

    if !assets.is_empty() {
        info!("release asset: uploaded {} assets", assets.len());
    }

    Ok(PublishOutcome {
        release: Some(release),
        assets,
    })
}

fn upload_file<S: ReleaseSource + ?Sized>(
    source: &S,
    release: &Release,
    file: &Path,
) -> Result<ReleaseAsset> {
    let name = asset_name(file)?;
    let data = fs::read(file)?;

    debug!(
        "release asset: uploading asset: {} from file: {}",
        name,
        file.display()
    );

    let asset = source.upload_asset(release.id, &name, &data)?;

    debug!(
        "release asset: uploaded asset: {}, id: {}",
        asset.name, asset.id
    );
    info!("release asset: uploaded asset {}", asset.name);

    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MockSource;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_compute_empty_repository() {
        let source = MockSource::new();
        let outcome = run_compute(&source, &Config::default()).unwrap();

        assert_eq!(outcome.plan.tag, "v0.0.0");
        assert!(!outcome.plan.released);
        assert!(outcome.prior_release.is_none());
        assert_eq!(
            outcome.warnings,
            vec![BoundaryWarning::NoNewCommits { latest_tag: None }]
        );
    }

    #[test]
    fn test_publish_skips_when_not_released() {
        let source = MockSource::new();
        let handoff = ReleaseHandoff {
            tag: "v1.0.0".to_string(),
            version: "1.0.0".to_string(),
            released: false,
            changelog: Vec::new(),
        };

        let outcome = run_publish(&source, &handoff, &[PathBuf::from("missing.bin")]).unwrap();
        assert!(outcome.release.is_none());
        assert!(source.created_releases().is_empty());
    }

    #[test]
    fn test_write_compute_results() {
        let mut source = MockSource::new();
        source.add_commit(CommitRecord::new(
            "a1",
            "feat: first",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let outcome = run_compute(&source, &Config::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut outputs = CommandFile::new(Some(dir.path().join("output")));
        let mut state = CommandFile::new(Some(dir.path().join("state")));
        write_compute_results(&outcome, "v", &mut outputs, &mut state).unwrap();

        let output = fs::read_to_string(dir.path().join("output")).unwrap();
        assert_eq!(
            output,
            "tag=v0.1.0\nversion=0.1.0\nversion-major=0\nversion-minor=1\nversion-patch=0\ntag-prefix=v\nreleased=true\n"
        );

        let state = fs::read_to_string(dir.path().join("state")).unwrap();
        assert!(state.contains("changelog=[\"feat: first\"]\n"));
        assert!(state.contains("released=true\n"));
    }
}
