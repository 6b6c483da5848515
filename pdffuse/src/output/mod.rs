//! Output formatting and display for pdffuse.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - The queue as a numbered list
//! - Merge plans and summary reports
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::output::OutputFormatter;
//! use pdffuse::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge");
//! formatter.success("Merge completed successfully");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::merge::PageContribution;
use crate::queue::{IntakeReport, QueueSnapshot};
use crate::session::{MergePlan, MergeReport};
use crate::utils::format_file_size;

/// Display the outcome of an intake batch.
pub fn display_intake(formatter: &OutputFormatter, report: &IntakeReport) {
    formatter.debug(&format!(
        "Accepted {} file(s), ignored {} non-PDF file(s)",
        report.accepted, report.rejected
    ));
}

/// Display the queue as a numbered list.
pub fn display_queue(formatter: &OutputFormatter, snapshot: &QueueSnapshot) {
    formatter.section(&format!("Queue ({} documents):", snapshot.len()));
    for entry in snapshot.entries() {
        formatter.list_item(
            entry.position,
            &format!("{} ({})", entry.name, entry.size_label),
        );
    }
}

/// Display a merge plan.
pub fn display_plan(formatter: &OutputFormatter, plan: &MergePlan) {
    formatter.section("Merge plan:");
    for contribution in &plan.contributions {
        formatter.info(&format!("  {}", describe_contribution(contribution)));
    }
    formatter.info(&format!(
        "Would write {} pages to {}",
        plan.total_pages, plan.output_name
    ));
}

/// Display the summary of a delivered merge.
pub fn display_merge_report(formatter: &OutputFormatter, report: &MergeReport) {
    formatter.success(&format!(
        "Merged {} file(s) into {} pages: {}",
        report.files_merged, report.total_pages, report.delivery.location
    ));

    for contribution in &report.contributions {
        formatter.debug(&describe_contribution(contribution));
    }
    formatter.detail("Input size", &format_file_size(report.input_size));
    formatter.detail("Output size", &format_file_size(report.output_size));
    formatter.detail("Merge time", &format!("{} ms", report.merge_time_ms));
}

fn describe_contribution(contribution: &PageContribution) -> String {
    match contribution.last_page() {
        Some(last) if last == contribution.first_page => {
            format!("page {} from {}", last, contribution.name)
        }
        Some(last) => format!(
            "pages {}-{} from {}",
            contribution.first_page, last, contribution.name
        ),
        None => format!("no pages from {}", contribution.name),
    }
}
