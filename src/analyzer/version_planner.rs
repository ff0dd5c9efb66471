use crate::domain::commit::{first_line, normalize_message};
use crate::domain::{ChangeSeverity, CommitHistory, CommitRecord, Release, RuleSet, SemanticVersion};
use crate::error::Result;
use tracing::debug;

/// Outcome of a planning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPlan {
    pub previous_version: SemanticVersion,
    pub next_version: SemanticVersion,
    pub tag: String,
    pub severity: ChangeSeverity,
    /// First line of every considered commit, newest first
    pub changelog: Vec<String>,
    pub released: bool,
    /// Commits listed after the boundary commit and dropped with it
    pub already_released: usize,
}

/// Derives the next version and changelog from a release and its commits
pub struct VersionPlanner {
    rules: RuleSet,
    init_version: String,
    tag_prefix: String,
}

impl VersionPlanner {
    /// Create a new version planner
    pub fn new(rules: RuleSet, init_version: impl Into<String>, tag_prefix: impl Into<String>) -> Self {
        VersionPlanner {
            rules,
            init_version: init_version.into(),
            tag_prefix: tag_prefix.into(),
        }
    }

    pub fn tag_prefix(&self) -> &str {
        &self.tag_prefix
    }

    /// Plan the next version.
    ///
    /// `commits` must be newest-first. When a prior release and its commit
    /// are known, only the commits listed before that boundary commit are
    /// considered.
    pub fn plan(
        &self,
        prior_release: Option<&Release>,
        prior_commit_id: Option<&str>,
        commits: &[CommitRecord],
    ) -> Result<VersionPlan> {
        let previous_version = SemanticVersion::parse(
            prior_release.map(|release| release.tag_name.as_str()),
            &self.init_version,
            &self.tag_prefix,
        )?;

        let history = CommitHistory::newest_first(commits.to_vec());
        let (retained, already_released) = match prior_release.and(prior_commit_id) {
            Some(boundary) => {
                let split = history.after_boundary(boundary)?;
                (split.newer, split.released)
            }
            None => (history.records(), 0),
        };

        debug!(
            commits = commits.len(),
            retained = retained.len(),
            already_released,
            "planner: considering commit messages"
        );

        let severity = self.analyze_messages(
            &retained
                .iter()
                .map(|commit| commit.message.as_str())
                .collect::<Vec<_>>(),
        );
        let next_version = previous_version.bump(severity)?;
        let changelog = retained
            .iter()
            .map(|commit| first_line(&normalize_message(&commit.message)).to_string())
            .collect();

        debug!(
            previous = %previous_version,
            next = %next_version,
            %severity,
            "planner: computed version"
        );

        Ok(VersionPlan {
            previous_version,
            next_version,
            tag: next_version.to_tag(&self.tag_prefix),
            severity,
            changelog,
            released: next_version.is_bumped(),
            already_released,
        })
    }

    /// Highest change severity over raw commit messages
    pub fn analyze_messages<S: AsRef<str>>(&self, messages: &[S]) -> ChangeSeverity {
        self.rules.classify_all(messages)
    }
}
