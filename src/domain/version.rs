use crate::error::{ReleaseError, Result};
use std::fmt;

/// Severity of the changes found in a commit range.
///
/// Ordered so that the run-level severity is simply the maximum over all
/// classified messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ChangeSeverity {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl ChangeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeSeverity::None => "none",
            ChangeSeverity::Patch => "patch",
            ChangeSeverity::Minor => "minor",
            ChangeSeverity::Major => "major",
        }
    }
}

impl fmt::Display for ChangeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic version representation.
///
/// Values are immutable: [`SemanticVersion::bump`] returns a new instance
/// carrying `bumped = true` when a component was incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    bumped: bool,
}

impl SemanticVersion {
    /// Create a new, not bumped, version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            bumped: false,
        }
    }

    /// Parse the baseline version of a run.
    ///
    /// Without a tag the configured initial version is parsed as a bare
    /// `MAJOR.MINOR.PATCH`. With a tag, `prefix` is stripped from its start
    /// and the remainder is parsed the same way.
    ///
    /// # Errors
    /// [`ReleaseError::InvalidVersionFormat`] when the string is not a plain
    /// `MAJOR.MINOR.PATCH` or the tag does not start with `prefix`.
    pub fn parse(tag: Option<&str>, init_version: &str, prefix: &str) -> Result<Self> {
        match tag {
            None => Self::parse_bare(init_version),
            Some(tag) => {
                let remainder = tag.strip_prefix(prefix).ok_or_else(|| {
                    ReleaseError::invalid_version(format!(
                        "tag '{}' does not start with prefix '{}'",
                        tag, prefix
                    ))
                })?;
                Self::parse_bare(remainder)
            }
        }
    }

    /// Parse a bare `MAJOR.MINOR.PATCH` string.
    pub fn parse_bare(version: &str) -> Result<Self> {
        let parsed = semver::Version::parse(version).map_err(|e| {
            ReleaseError::invalid_version(format!("'{}' - expected X.Y.Z ({})", version, e))
        })?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaseError::invalid_version(format!(
                "'{}' - pre-release and build metadata are not supported",
                version
            )));
        }

        Ok(SemanticVersion::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Bump version according to the severity of the changes.
    ///
    /// - **Major**: major += 1, minor = 0, patch = 0
    /// - **Minor**: minor += 1, patch = 0
    /// - **Patch**: patch += 1
    /// - **None**: unchanged, not bumped
    ///
    /// # Errors
    /// [`ReleaseError::InvalidVersionFormat`] when the bumped component
    /// would overflow.
    pub fn bump(&self, severity: ChangeSeverity) -> Result<Self> {
        let increment = |component: u64, name: &str| {
            component.checked_add(1).ok_or_else(|| {
                ReleaseError::invalid_version(format!("cannot bump {} of '{}': overflow", name, self))
            })
        };

        let (major, minor, patch) = match severity {
            ChangeSeverity::None => {
                return Ok(SemanticVersion {
                    bumped: false,
                    ..*self
                })
            }
            ChangeSeverity::Major => (increment(self.major, "major")?, 0, 0),
            ChangeSeverity::Minor => (self.major, increment(self.minor, "minor")?, 0),
            ChangeSeverity::Patch => (self.major, self.minor, increment(self.patch, "patch")?),
        };

        Ok(SemanticVersion {
            major,
            minor,
            patch,
            bumped: true,
        })
    }

    /// Whether this instance was produced by an actual bump
    pub fn is_bumped(&self) -> bool {
        self.bumped
    }

    /// Format as a tag, e.g. prefix "v" -> "v1.2.3"
    pub fn to_tag(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
