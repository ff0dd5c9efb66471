//! Domain logic - pure versioning rules independent of the hosting platform

pub mod commit;
pub mod release;
pub mod rules;
pub mod version;

pub use commit::{BoundarySplit, CommitHistory, CommitRecord};
pub use release::{select_current_release, Release, ReleaseAsset, SelectionMode, TagPolicy, TagRef};
pub use rules::{RulePreset, RuleSet};
pub use version::{ChangeSeverity, SemanticVersion};
