//! Pure formatting functions for terminal output.
//!
//! Diagnostics go through `tracing`; this module only renders what the
//! user asked for: the rule set in effect and the outcome of the run.

use crate::cli::orchestration::RunSummary;
use crate::config::Settings;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// Lines describing the rule set in effect.
pub fn format_rules(settings: &Settings) -> Vec<String> {
    let mut lines = vec![format!("Repository: {}", settings.repository)];

    for (index, rule) in settings.rules.retention.iter().enumerate() {
        lines.push(format!("  rule {}: {}", index, rule));
    }
    for (index, exception) in settings.rules.exceptions.iter().enumerate() {
        lines.push(format!("  exception {}: {}", index, exception));
    }

    lines
}

/// Display the rule set in effect.
pub fn display_rules(settings: &Settings) {
    println!("\n\x1b[1mRetention policy\x1b[0m");
    for line in format_rules(settings) {
        println!("{}", line);
    }
}

/// Headline for a finished run.
///
/// # Examples
///
/// ```ignore
/// "3 tag(s) would be deleted (dry run)"
/// "2 tag(s) deleted, 1 failed"
/// ```
pub fn format_outcome(summary: &RunSummary) -> String {
    let report = &summary.report;
    if report.dry_run {
        format!("{} tag(s) would be deleted (dry run)", report.deleted.len())
    } else if report.failed.is_empty() {
        format!("{} tag(s) deleted", report.deleted.len())
    } else {
        format!(
            "{} tag(s) deleted, {} failed",
            report.deleted.len(),
            report.failed.len()
        )
    }
}

/// Lines listing the tags a run selected: a heading, then every deleted
/// (or would-be deleted) tag and every failed deletion.
///
/// Warnings are not part of the listing; they are logged once through
/// `tracing` when they arise.
pub fn format_selection(summary: &RunSummary) -> Vec<String> {
    let report = &summary.report;
    let mut lines = vec![format!(
        "{} of {} tag(s) selected in {}",
        report.deleted.len() + report.failed.len(),
        summary.inventory,
        summary.repository
    )];
    lines.extend(report.deleted.iter().map(|name| format!("  - {}", name)));
    lines.extend(
        report
            .failed
            .iter()
            .map(|(name, reason)| format!("  ✗ {} ({})", name, reason)),
    );
    lines
}

/// Display the outcome of a run: affected tags and the headline.
pub fn display_summary(summary: &RunSummary) {
    let mut lines = format_selection(summary).into_iter();
    if let Some(heading) = lines.next() {
        println!("\n\x1b[1m{}\x1b[0m", heading);
    }
    for line in lines {
        println!("{}", line);
    }

    if summary.report.is_success() {
        display_success(&format_outcome(summary));
    } else {
        display_error(&format_outcome(summary));
    }
}
