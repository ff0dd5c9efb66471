//! Release data source abstraction
//!
//! The [ReleaseSource] trait describes the hosting platform operations the
//! compute and publish phases need. Implementations:
//!
//! - [client::GithubClient]: blocking GitHub REST client built on `ureq`
//! - [mock::MockSource]: in-memory source for tests
//!
//! Workflow code depends on the trait so it can run against either.

pub mod client;
pub mod mock;

pub use client::GithubClient;
pub use mock::MockSource;

use crate::domain::{CommitRecord, Release, ReleaseAsset, TagRef};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Hosting platform operations used by the release workflows
pub trait ReleaseSource: Send + Sync {
    /// Latest published release, if the platform reports one.
    ///
    /// Failures are treated as "no release"; callers fall back to
    /// [ReleaseSource::list_releases].
    fn latest_release(&self) -> Option<Release>;

    /// Every release of the repository, pagination already flattened and
    /// duplicates removed
    fn list_releases(&self) -> Result<Vec<Release>>;

    /// Every tag of the repository with the commit it points to
    fn list_tags(&self) -> Result<Vec<TagRef>>;

    /// A single commit by id
    fn get_commit(&self, commit_id: &str) -> Result<CommitRecord>;

    /// Commits authored at or after `since` (all commits when `None`),
    /// newest first
    fn list_commits_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<CommitRecord>>;

    /// Create a published, non-prerelease release named after its tag
    fn create_release(&self, tag: &str, body: &str) -> Result<Release>;

    /// Attach an asset to a release
    fn upload_asset(&self, release_id: u64, name: &str, data: &[u8]) -> Result<ReleaseAsset>;
}
