//! Planning engine for determining the next version from commits

pub mod version_planner;

pub use version_planner::{VersionPlan, VersionPlanner};
