use crate::domain::SelectionMode;
use std::fmt;

/// Non-fatal conditions met while locating the previous release and its
/// commit range. These are reported to the user but do not stop a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No commits newer than the previous release
    NoNewCommits { latest_tag: Option<String> },
    /// The latest-release shortcut returned nothing usable
    LatestReleaseUnavailable,
    /// Releases skipped because their tag does not satisfy the prefix policy
    ReleasesExcluded {
        count: usize,
        prefix: String,
        mode: SelectionMode,
    },
    /// The release tag is not among the repository tags
    ReleaseTagNotFound { tag: String },
    /// The release commit is not part of the listed history
    BoundaryCommitNotInHistory { tag: String, commit_id: String },
    /// Commits listed after the release commit, dropped as already released
    CommitsBeforeRelease { tag: String, count: usize },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits { latest_tag } => match latest_tag {
                Some(tag) => write!(f, "No new commits since release '{}'", tag),
                None => write!(f, "No commits found in repository history"),
            },
            BoundaryWarning::LatestReleaseUnavailable => write!(
                f,
                "Latest release lookup returned no matching release, listing all releases"
            ),
            BoundaryWarning::ReleasesExcluded {
                count,
                prefix,
                mode,
            } => {
                let policy = match mode {
                    SelectionMode::Prefix => format!("prefix '{}'", prefix),
                    SelectionMode::Strict => format!("pattern '{}MAJOR.MINOR.PATCH'", prefix),
                };
                write!(f, "Skipped {} release(s) not matching {}", count, policy)
            }
            BoundaryWarning::ReleaseTagNotFound { tag } => write!(
                f,
                "Tag '{}' of the latest release was not found, considering all commits",
                tag
            ),
            BoundaryWarning::BoundaryCommitNotInHistory { tag, commit_id } => {
                let short_id = commit_id.get(..7).unwrap_or(commit_id);
                write!(
                    f,
                    "Commit {} of release '{}' is not in the listed history, nothing excluded",
                    short_id, tag
                )
            }
            BoundaryWarning::CommitsBeforeRelease { tag, count } => write!(
                f,
                "Ignored {} commit(s) listed after the commit of release '{}', already released",
                count, tag
            ),
        }
    }
}
