//! Typed state passed from the compute phase to the publish phase.
//!
//! The compute phase stores the handoff as individual string entries
//! (`tag`, `version`, `released`, `changelog`). The publish phase reads them
//! back and validates them before acting on them.

use crate::analyzer::VersionPlan;
use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};

pub const TAG_KEY: &str = "tag";
pub const VERSION_KEY: &str = "version";
pub const RELEASED_KEY: &str = "released";
pub const CHANGELOG_KEY: &str = "changelog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseHandoff {
    pub tag: String,
    pub version: String,
    pub released: bool,
    pub changelog: Vec<String>,
}

impl From<&VersionPlan> for ReleaseHandoff {
    fn from(plan: &VersionPlan) -> Self {
        ReleaseHandoff {
            tag: plan.tag.clone(),
            version: plan.next_version.to_string(),
            released: plan.released,
            changelog: plan.changelog.clone(),
        }
    }
}

impl ReleaseHandoff {
    /// Serialize to the key/value entries persisted between phases
    pub fn to_entries(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (TAG_KEY, self.tag.clone()),
            (VERSION_KEY, self.version.clone()),
            (RELEASED_KEY, self.released.to_string()),
            (CHANGELOG_KEY, serde_json::to_string(&self.changelog)?),
        ])
    }

    /// Rebuild and validate a handoff from persisted entries
    pub fn from_entries<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).ok_or_else(|| ReleaseError::handoff(format!("missing state entry '{}'", key)))
        };

        let released_raw = require(RELEASED_KEY)?;
        let released: bool = serde_json::from_str(released_raw.trim()).map_err(|_| {
            ReleaseError::handoff(format!(
                "state entry '{}' is not a boolean: '{}'",
                RELEASED_KEY, released_raw
            ))
        })?;

        let changelog_raw = require(CHANGELOG_KEY)?;
        let changelog: Vec<String> = serde_json::from_str(&changelog_raw).map_err(|e| {
            ReleaseError::handoff(format!(
                "state entry '{}' is not a JSON list of strings: {}",
                CHANGELOG_KEY, e
            ))
        })?;

        let handoff = ReleaseHandoff {
            tag: require(TAG_KEY)?,
            version: require(VERSION_KEY)?,
            released,
            changelog,
        };
        handoff.validate()?;

        Ok(handoff)
    }

    /// Check internal consistency of the handoff
    pub fn validate(&self) -> Result<()> {
        let version = SemanticVersion::parse_bare(&self.version)
            .map_err(|e| ReleaseError::handoff(format!("invalid version: {}", e)))?;

        if !self.tag.ends_with(&version.to_string()) {
            return Err(ReleaseError::handoff(format!(
                "tag '{}' does not carry version '{}'",
                self.tag, self.version
            )));
        }

        if self.changelog.iter().any(|line| line.contains('\n')) {
            return Err(ReleaseError::handoff("changelog entries must be single lines"));
        }

        Ok(())
    }

    /// Markdown body of the release created for this handoff
    pub fn release_body(&self) -> String {
        let changelog: String = self
            .changelog
            .iter()
            .map(|line| format!("* {}\n", line))
            .collect();

        format!("**Changelog:**\n{}", changelog)
    }
}
