use crate::domain::commit::{first_line, normalize_message};
use crate::domain::version::ChangeSeverity;
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BREAKING_SUBJECT: &str = r"^[\w-]+(\([^)]+\))?!: ";
const FEATURE_SUBJECT: &str = r"^feat(\([^)]+\))?: ";
const FIX_SUBJECT: &str = r"^fix(\([^)]+\))?: ";
const DEPENDENCY_SUBJECT: &str = r"^chore\(deps.*\): ";

/// Default literal marking a breaking change anywhere in a message
pub const DEFAULT_BREAKING_MARKER: &str = "BREAKING CHANGE";

/// Named classification rule sets.
///
/// `Conventional` recognizes `feat` and `fix`; `ConventionalDeps` also
/// treats `chore(deps...)` commits as patch-level changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulePreset {
    #[default]
    Conventional,
    ConventionalDeps,
}

/// What part of a normalized message a rule inspects
#[derive(Debug, Clone)]
enum Matcher {
    /// Regex applied to the subject line
    Subject(Regex),
    /// Literal searched in the whole message
    Contains(String),
}

#[derive(Debug, Clone)]
struct Rule {
    severity: ChangeSeverity,
    matcher: Matcher,
}

impl Rule {
    fn matches(&self, message: &str) -> bool {
        match &self.matcher {
            Matcher::Subject(re) => re.is_match(first_line(message)),
            Matcher::Contains(literal) => message.contains(literal.as_str()),
        }
    }
}

/// Ordered commit classification rules.
///
/// Rules are kept sorted from the most to the least severe, so the first
/// matching rule gives the severity of a message.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set from a preset plus additional patch-level subject patterns
    pub fn new(
        preset: RulePreset,
        breaking_marker: &str,
        extra_patch_patterns: &[String],
    ) -> Result<Self> {
        let mut rules = vec![Rule {
            severity: ChangeSeverity::Major,
            matcher: Matcher::Subject(Regex::new(BREAKING_SUBJECT)?),
        }];

        if !breaking_marker.is_empty() {
            rules.push(Rule {
                severity: ChangeSeverity::Major,
                matcher: Matcher::Contains(breaking_marker.to_string()),
            });
        }

        rules.push(Rule {
            severity: ChangeSeverity::Minor,
            matcher: Matcher::Subject(Regex::new(FEATURE_SUBJECT)?),
        });
        rules.push(Rule {
            severity: ChangeSeverity::Patch,
            matcher: Matcher::Subject(Regex::new(FIX_SUBJECT)?),
        });

        if preset == RulePreset::ConventionalDeps {
            rules.push(Rule {
                severity: ChangeSeverity::Patch,
                matcher: Matcher::Subject(Regex::new(DEPENDENCY_SUBJECT)?),
            });
        }

        for pattern in extra_patch_patterns {
            rules.push(Rule {
                severity: ChangeSeverity::Patch,
                matcher: Matcher::Subject(Regex::new(pattern)?),
            });
        }

        Ok(RuleSet { rules })
    }

    /// Classify a single raw commit message
    pub fn classify(&self, message: &str) -> ChangeSeverity {
        let message = normalize_message(message);

        self.rules
            .iter()
            .find(|rule| rule.matches(&message))
            .map(|rule| rule.severity)
            .unwrap_or(ChangeSeverity::None)
    }

    /// Highest severity over all messages; `None` for an empty slice
    pub fn classify_all<S: AsRef<str>>(&self, messages: &[S]) -> ChangeSeverity {
        messages
            .iter()
            .map(|message| self.classify(message.as_ref()))
            .max()
            .unwrap_or(ChangeSeverity::None)
    }
}
