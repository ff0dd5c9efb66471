//! Pure formatting functions for console output.
//!
//! Message builders return plain strings so they can be tested; the
//! `display_*` functions style and print them.

use console::style;

use crate::analyzer::VersionPlan;
use crate::boundary::BoundaryWarning;
use crate::domain::{Release, ReleaseAsset};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Summary line of a plan, e.g. "1.2.3 -> 1.3.0 (minor)"
pub fn plan_summary(plan: &VersionPlan) -> String {
    if plan.released {
        format!(
            "{} -> {} ({}), tag: {}",
            plan.previous_version, plan.next_version, plan.severity, plan.tag
        )
    } else {
        format!("{} unchanged, no new version", plan.previous_version)
    }
}

/// Changelog listing, at most `limit` entries followed by a remainder count
pub fn changelog_lines(changelog: &[String], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = changelog
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, line)| format!("  {}. {}", i + 1, line))
        .collect();

    if changelog.len() > limit {
        lines.push(format!("  ... and {} more commits", changelog.len() - limit));
    }

    lines
}

/// Display the computed plan with its changelog.
pub fn display_plan(plan: &VersionPlan) {
    eprintln!("\n{}", style("Version plan:").bold());
    if plan.released {
        eprintln!(
            "  From: {}",
            style(plan.previous_version.to_string()).red()
        );
        eprintln!("  To:   {}", style(&plan.tag).green());
    } else {
        eprintln!("  {}", plan_summary(plan));
    }

    if !plan.changelog.is_empty() {
        eprintln!("{}", style(format!("{} commits:", plan.changelog.len())).underlined());
        for line in changelog_lines(&plan.changelog, 10) {
            eprintln!("{}", line);
        }
    }
}

/// Display the outcome of the publish phase.
pub fn display_publish_summary(release: &Release, assets: &[ReleaseAsset]) {
    display_success(&format!(
        "Published release {} (id: {})",
        release.tag_name, release.id
    ));
    for asset in assets {
        eprintln!("  - {}", asset.name);
    }
}
