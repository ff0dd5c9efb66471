use crate::error::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A published release on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
}

/// An asset attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
}

/// A repository tag and the commit it points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub commit_id: String,
}

/// How strictly release tags must follow the configured prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Any tag starting with the prefix
    #[default]
    Prefix,
    /// Exactly `prefix` followed by `MAJOR.MINOR.PATCH`
    Strict,
}

/// Tag filter applied to releases before one is selected as current
#[derive(Debug, Clone)]
pub struct TagPolicy {
    prefix: String,
    mode: SelectionMode,
    strict: Regex,
}

impl TagPolicy {
    pub fn new(prefix: impl Into<String>, mode: SelectionMode) -> Result<Self> {
        let prefix = prefix.into();
        let strict = Regex::new(&format!(
            r"^{}(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)$",
            regex::escape(&prefix)
        ))?;

        Ok(TagPolicy {
            prefix,
            mode,
            strict,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Whether a tag is eligible under this policy
    pub fn matches(&self, tag: &str) -> bool {
        match self.mode {
            SelectionMode::Prefix => tag.starts_with(&self.prefix),
            SelectionMode::Strict => self.strict.is_match(tag),
        }
    }
}

/// Select the release to treat as current.
///
/// Releases whose tag does not satisfy `policy` are skipped. Among the rest
/// the most recently created wins; on equal timestamps the later entry in
/// `releases` wins.
pub fn select_current_release<'a>(releases: &'a [Release], policy: &TagPolicy) -> Option<&'a Release> {
    // max_by_key keeps the last of equal maxima
    releases
        .iter()
        .filter(|release| policy.matches(&release.tag_name))
        .max_by_key(|release| release.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn release(id: u64, tag: &str, day: u32) -> Release {
        Release {
            id,
            tag_name: tag.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Release> {
        vec![
            release(1, "v1.0.0", 1),
            release(2, "v2.0.0-rc1", 20),
            release(3, "v1.5.0", 10),
        ]
    }

    #[test]
    fn test_strict_selection_skips_prerelease_tags() {
        let releases = sample();
        let policy = TagPolicy::new("v", SelectionMode::Strict).unwrap();
        let selected = select_current_release(&releases, &policy).unwrap();
        assert_eq!(selected.tag_name, "v1.5.0");
    }

    #[test]
    fn test_prefix_selection_takes_latest_created() {
        let releases = sample();
        let policy = TagPolicy::new("v", SelectionMode::Prefix).unwrap();
        let selected = select_current_release(&releases, &policy).unwrap();
        assert_eq!(selected.tag_name, "v2.0.0-rc1");
    }

    #[test]
    fn test_selection_ignores_other_prefixes() {
        let releases = vec![release(1, "v1.0.0", 1), release(2, "app-9.0.0", 5)];
        let policy = TagPolicy::new("v", SelectionMode::Prefix).unwrap();
        assert_eq!(
            select_current_release(&releases, &policy).unwrap().tag_name,
            "v1.0.0"
        );
    }

    #[test]
    fn test_selection_empty() {
        let policy = TagPolicy::new("v", SelectionMode::Prefix).unwrap();
        assert!(select_current_release(&[], &policy).is_none());

        let releases = vec![release(1, "release-1.0.0", 1)];
        assert!(select_current_release(&releases, &policy).is_none());
    }

    #[test]
    fn test_selection_tie_last_wins() {
        let releases = vec![release(1, "v1.0.0", 4), release(2, "v1.0.1", 4)];
        let policy = TagPolicy::new("v", SelectionMode::Strict).unwrap();
        assert_eq!(select_current_release(&releases, &policy).unwrap().id, 2);
    }

    #[test]
    fn test_selection_order_independent_of_list_order() {
        let releases = vec![release(3, "v1.5.0", 10), release(1, "v1.0.0", 1)];
        let policy = TagPolicy::new("v", SelectionMode::Strict).unwrap();
        assert_eq!(select_current_release(&releases, &policy).unwrap().id, 3);
    }

    #[test]
    fn test_strict_policy_escapes_prefix() {
        let policy = TagPolicy::new("app.v", SelectionMode::Strict).unwrap();
        assert!(policy.matches("app.v1.2.3"));
        assert!(!policy.matches("appxv1.2.3"));
        assert!(!policy.matches("app.v1.2"));
        assert!(!policy.matches("app.v01.2.3"));
    }

    #[test]
    fn test_strict_policy_empty_prefix() {
        let policy = TagPolicy::new("", SelectionMode::Strict).unwrap();
        assert!(policy.matches("1.2.3"));
        assert!(!policy.matches("v1.2.3"));
    }
}
