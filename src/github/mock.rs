use crate::domain::{CommitRecord, Release, ReleaseAsset, TagRef};
use crate::error::{ReleaseError, Result};
use crate::github::ReleaseSource;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// A release created through the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRelease {
    pub id: u64,
    pub tag: String,
    pub body: String,
}

/// An asset uploaded through the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub release_id: u64,
    pub name: String,
    pub size: usize,
}

/// In-memory release source for testing without network access
#[derive(Default)]
pub struct MockSource {
    releases: Vec<Release>,
    latest: Option<Release>,
    tags: Vec<TagRef>,
    /// Newest first
    commits: Vec<CommitRecord>,
    fail_listing: bool,
    fail_upload_at: Option<usize>,
    created: Mutex<Vec<CreatedRelease>>,
    uploaded: Mutex<Vec<UploadedAsset>>,
}

impl MockSource {
    /// Create a new empty mock source
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_release(&mut self, release: Release) {
        self.releases.push(release);
    }

    /// Release returned by the latest-release shortcut
    pub fn set_latest_release(&mut self, release: Release) {
        self.latest = Some(release);
    }

    pub fn add_tag(&mut self, name: impl Into<String>, commit_id: impl Into<String>) {
        self.tags.push(TagRef {
            name: name.into(),
            commit_id: commit_id.into(),
        });
    }

    /// Add a commit; commits must be added newest first
    pub fn add_commit(&mut self, commit: CommitRecord) {
        self.commits.push(commit);
    }

    /// Make release listing fail
    pub fn fail_listing(&mut self) {
        self.fail_listing = true;
    }

    /// Make the n-th upload (zero based) fail
    pub fn fail_upload_at(&mut self, index: usize) {
        self.fail_upload_at = Some(index);
    }

    pub fn created_releases(&self) -> Vec<CreatedRelease> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn uploaded_assets(&self) -> Vec<UploadedAsset> {
        self.uploaded.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

impl ReleaseSource for MockSource {
    fn latest_release(&self) -> Option<Release> {
        self.latest.clone()
    }

    fn list_releases(&self) -> Result<Vec<Release>> {
        if self.fail_listing {
            return Err(ReleaseError::api("GET releases: status code 500"));
        }
        Ok(self.releases.clone())
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }

    fn get_commit(&self, commit_id: &str) -> Result<CommitRecord> {
        self.commits
            .iter()
            .find(|commit| commit.id == commit_id)
            .cloned()
            .ok_or_else(|| ReleaseError::api(format!("GET commits/{}: status code 404", commit_id)))
    }

    fn list_commits_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<CommitRecord>> {
        Ok(self
            .commits
            .iter()
            .filter(|commit| since.map_or(true, |since| commit.authored_at >= since))
            .cloned()
            .collect())
    }

    fn create_release(&self, tag: &str, body: &str) -> Result<Release> {
        let mut created = self
            .created
            .lock()
            .map_err(|_| ReleaseError::api("mock state poisoned"))?;

        let id = 1000 + created.len() as u64;
        created.push(CreatedRelease {
            id,
            tag: tag.to_string(),
            body: body.to_string(),
        });

        Ok(Release {
            id,
            tag_name: tag.to_string(),
            created_at: Utc::now(),
        })
    }

    fn upload_asset(&self, release_id: u64, name: &str, data: &[u8]) -> Result<ReleaseAsset> {
        let mut uploaded = self
            .uploaded
            .lock()
            .map_err(|_| ReleaseError::api("mock state poisoned"))?;

        if self.fail_upload_at == Some(uploaded.len()) {
            return Err(ReleaseError::api(format!(
                "POST releases/{}/assets?name={}: status code 422",
                release_id, name
            )));
        }

        uploaded.push(UploadedAsset {
            release_id,
            name: name.to_string(),
            size: data.len(),
        });

        Ok(ReleaseAsset {
            id: uploaded.len() as u64,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_mock_commits_since() {
        let mut source = MockSource::new();
        source.add_commit(CommitRecord::new("c", "fix: c", at(3)));
        source.add_commit(CommitRecord::new("b", "fix: b", at(2)));
        source.add_commit(CommitRecord::new("a", "fix: a", at(1)));

        assert_eq!(source.list_commits_since(None).unwrap().len(), 3);

        let since = source.list_commits_since(Some(at(2))).unwrap();
        let ids: Vec<&str> = since.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn test_mock_get_commit() {
        let mut source = MockSource::new();
        source.add_commit(CommitRecord::new("abc", "feat: x", at(1)));

        assert_eq!(source.get_commit("abc").unwrap().message, "feat: x");
        assert!(source.get_commit("def").is_err());
    }

    #[test]
    fn test_mock_records_created_releases() {
        let source = MockSource::new();
        let release = source.create_release("v1.0.0", "body").unwrap();

        assert_eq!(release.tag_name, "v1.0.0");
        assert_eq!(source.created_releases().len(), 1);
        assert_eq!(source.created_releases()[0].id, release.id);
    }

    #[test]
    fn test_mock_upload_failure() {
        let mut source = MockSource::new();
        source.fail_upload_at(1);

        assert!(source.upload_asset(1, "a", b"1").is_ok());
        assert!(source.upload_asset(1, "b", b"2").is_err());
        assert_eq!(source.uploaded_assets().len(), 1);
    }

    #[test]
    fn test_mock_listing_failure() {
        let mut source = MockSource::new();
        source.fail_listing();
        assert!(source.list_releases().is_err());
    }
}
