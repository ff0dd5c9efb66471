use crate::error::{ReleaseError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// A commit as delivered by the release data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub message: String,
    pub authored_at: DateTime<Utc>,
}

impl CommitRecord {
    pub fn new(id: impl Into<String>, message: impl Into<String>, authored_at: DateTime<Utc>) -> Self {
        CommitRecord {
            id: id.into(),
            message: message.into(),
            authored_at,
        }
    }
}

/// Normalize a commit message before classification.
///
/// Carriage returns are removed and the blank line separating the subject
/// from the body is collapsed, so `subject\n\nbody` becomes `subject\nbody`.
/// Only the first blank line after the subject is collapsed.
pub fn normalize_message(message: &str) -> String {
    let mut text: String = message.chars().filter(|c| *c != '\r').collect();

    if let Some(idx) = text.find('\n') {
        if text[idx + 1..].starts_with('\n') {
            text.remove(idx + 1);
        }
    }

    text
}

/// First line of a message, used as its changelog entry
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Commit history ordered newest-first.
///
/// Duplicate commit ids are dropped, keeping the first (newest) occurrence.
#[derive(Debug, Clone, Default)]
pub struct CommitHistory {
    records: Vec<CommitRecord>,
}

impl CommitHistory {
    /// Wrap a newest-first commit list as returned by the data source
    pub fn newest_first(records: Vec<CommitRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .collect();

        CommitHistory { records }
    }

    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    /// Split the history at the boundary commit of the previous release.
    ///
    /// Entries before the boundary are newer and are kept. The boundary and
    /// anything listed after it already belong to the previous release; the
    /// latter happens when ancestors of the release commit were authored
    /// after it. When the boundary commit is absent, the whole history is
    /// kept.
    ///
    /// # Errors
    /// [`ReleaseError::History`] when the boundary is the first entry of a
    /// longer history listed in ascending author order, i.e. oldest first.
    pub fn after_boundary(&self, boundary_id: &str) -> Result<BoundarySplit<'_>> {
        let Some(idx) = self.records.iter().position(|record| record.id == boundary_id) else {
            return Ok(BoundarySplit {
                newer: &self.records,
                released: 0,
            });
        };

        if idx == 0 && self.is_oldest_first() {
            return Err(ReleaseError::history(format!(
                "boundary commit {} is the first of {} commits listed oldest first, expected a newest-first history",
                boundary_id,
                self.records.len()
            )));
        }

        Ok(BoundarySplit {
            newer: &self.records[..idx],
            released: self.records.len() - idx - 1,
        })
    }

    fn is_oldest_first(&self) -> bool {
        let (Some(first), Some(last)) = (self.records.first(), self.records.last()) else {
            return false;
        };

        first.authored_at < last.authored_at
            && self
                .records
                .windows(2)
                .all(|pair| pair[0].authored_at <= pair[1].authored_at)
    }
}

/// History split at the boundary commit of the previous release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundarySplit<'a> {
    /// Commits newer than the boundary, newest first
    pub newer: &'a [CommitRecord],
    /// Commits listed after the boundary, dropped as already released
    pub released: usize,
}
