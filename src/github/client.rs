use crate::action::RepositoryIdentity;
use crate::domain::{CommitRecord, Release, ReleaseAsset, TagRef};
use crate::error::{ReleaseError, Result};
use crate::github::ReleaseSource;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

const PER_PAGE: usize = 100;
const DEFAULT_UPLOADS_URL: &str = "https://uploads.github.com";
const USER_AGENT: &str = concat!("conventional-release/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct WireTag {
    name: String,
    commit: WireTagCommit,
}

#[derive(Debug, Deserialize)]
struct WireTagCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct WireCommit {
    sha: String,
    commit: WireCommitDetail,
}

#[derive(Debug, Deserialize)]
struct WireCommitDetail {
    message: String,
    author: Option<WireSignature>,
    committer: Option<WireSignature>,
}

#[derive(Debug, Deserialize)]
struct WireSignature {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct NewRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

impl TryFrom<WireCommit> for CommitRecord {
    type Error = ReleaseError;

    fn try_from(wire: WireCommit) -> Result<Self> {
        let authored_at = wire
            .commit
            .author
            .and_then(|author| author.date)
            .or_else(|| wire.commit.committer.and_then(|committer| committer.date))
            .ok_or_else(|| ReleaseError::api(format!("commit {} has no author date", wire.sha)))?;

        Ok(CommitRecord {
            id: wire.sha,
            message: wire.commit.message,
            authored_at,
        })
    }
}

/// Blocking client for the GitHub REST API
pub struct GithubClient {
    agent: Agent,
    api_url: String,
    uploads_url: String,
    owner: String,
    repo: String,
    token: String,
    max_release_pages: u32,
}

impl GithubClient {
    /// Create a client for the given repository
    pub fn new(identity: RepositoryIdentity, max_release_pages: u32) -> Self {
        debug!(
            owner = %identity.owner,
            repo = %identity.repo,
            "github: creating client"
        );

        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(60)))
            .build();

        let uploads_url = if identity.api_url == crate::action::DEFAULT_API_URL {
            DEFAULT_UPLOADS_URL.to_string()
        } else {
            // GitHub Enterprise serves uploads under /api/uploads
            identity.api_url.replace("/api/v3", "/api/uploads")
        };

        GithubClient {
            agent: Agent::new_with_config(config),
            api_url: identity.api_url,
            uploads_url,
            owner: identity.owner,
            repo: identity.repo,
            token: identity.token,
            max_release_pages: max_release_pages.max(1),
        }
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path)
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Authorization", self.authorization());

        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request
            .call()
            .map_err(|e| ReleaseError::api(format!("GET {}: {}", url, e)))?;

        response
            .body_mut()
            .read_json::<T>()
            .map_err(|e| ReleaseError::api(format!("GET {}: invalid response: {}", url, e)))
    }

    /// Fetch consecutive pages until a short page or `max_pages` is reached
    fn get_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        max_pages: Option<u32>,
    ) -> Result<Vec<T>> {
        let url = self.repo_url(path);
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("per_page", PER_PAGE.to_string()));
            page_query.push(("page", page.to_string()));

            let next: Vec<T> = self.get_json(&url, &page_query)?;
            let count = next.len();

            debug!(
                "github: found: {} new {} on page: {}, already found: {}",
                count,
                path,
                page,
                items.len()
            );

            items.extend(next);

            if count < PER_PAGE || max_pages.is_some_and(|max| page >= max) {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

impl ReleaseSource for GithubClient {
    fn latest_release(&self) -> Option<Release> {
        debug!("github: getting latest release");

        let release = self
            .get_json::<Release>(&self.repo_url("releases/latest"), &[])
            .map_err(|e| debug!("github: latest release unavailable: {}", e))
            .ok();

        debug!(
            "github: found latest release tag: {:?}",
            release.as_ref().map(|r| &r.tag_name)
        );

        release
    }

    fn list_releases(&self) -> Result<Vec<Release>> {
        debug!(limit = self.max_release_pages, "github: getting all releases");

        let releases: Vec<Release> =
            self.get_pages("releases", &[], Some(self.max_release_pages))?;

        let mut seen = HashSet::new();
        let releases: Vec<Release> = releases
            .into_iter()
            .filter(|release| seen.insert(release.id))
            .collect();

        debug!("github: found: {} releases", releases.len());

        Ok(releases)
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        debug!("github: getting tags");

        let tags: Vec<WireTag> = self.get_pages("tags", &[], None)?;

        debug!("github: found: {} tags", tags.len());

        Ok(tags
            .into_iter()
            .map(|tag| TagRef {
                name: tag.name,
                commit_id: tag.commit.sha,
            })
            .collect())
    }

    fn get_commit(&self, commit_id: &str) -> Result<CommitRecord> {
        debug!("github: getting commit sha: {}", commit_id);

        let commit: WireCommit =
            self.get_json(&self.repo_url(&format!("commits/{}", commit_id)), &[])?;

        debug!("github: found commit sha: {}", commit.sha);

        commit.try_into()
    }

    fn list_commits_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<CommitRecord>> {
        debug!("github: getting commits since: {:?}", since);

        let query: Vec<(&str, String)> = since
            .map(|since| ("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .into_iter()
            .collect();

        let commits: Vec<WireCommit> = self.get_pages("commits", &query, None)?;

        debug!("github: found {} commits", commits.len());

        commits.into_iter().map(CommitRecord::try_from).collect()
    }

    fn create_release(&self, tag: &str, body: &str) -> Result<Release> {
        debug!("github: creating release with tag: {}", tag);

        let url = self.repo_url("releases");
        let payload = NewRelease {
            tag_name: tag,
            name: tag,
            body,
            draft: false,
            prerelease: false,
        };

        let mut response = self
            .agent
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Authorization", self.authorization())
            .send_json(&payload)
            .map_err(|e| ReleaseError::api(format!("POST {}: {}", url, e)))?;

        response
            .body_mut()
            .read_json::<Release>()
            .map_err(|e| ReleaseError::api(format!("POST {}: invalid response: {}", url, e)))
    }

    fn upload_asset(&self, release_id: u64, name: &str, data: &[u8]) -> Result<ReleaseAsset> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.uploads_url, self.owner, self.repo, release_id
        );

        debug!(
            "github: uploading asset: {} ({} bytes) to release: {}",
            name,
            data.len(),
            release_id
        );

        let mut response = self
            .agent
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Authorization", self.authorization())
            .header("Content-Type", "application/octet-stream")
            .query("name", name)
            .send(data)
            .map_err(|e| ReleaseError::api(format!("POST {}?name={}: {}", url, name, e)))?;

        response
            .body_mut()
            .read_json::<ReleaseAsset>()
            .map_err(|e| ReleaseError::api(format!("POST {}: invalid response: {}", url, e)))
    }
}
