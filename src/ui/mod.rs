//! User interface module - console formatting.
//!
//! Everything is written to stderr so stdout stays free for outputs printed
//! outside of a runner.

pub mod formatter;

pub use formatter::{
    changelog_lines, display_boundary_warning, display_error, display_plan,
    display_publish_summary, display_status, display_success, plan_summary,
};
