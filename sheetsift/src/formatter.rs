//! Output formatters for filter results

use anyhow::Result;
use colored::*;
use sheetsift_core::{FilterResult, SiftOutput};
use std::path::Path;

/// Print a human-readable run summary with colors
pub fn print_human(file_path: &Path, column: &str, filter: &str, output: &SiftOutput) {
    println!("{}", format!("Filtering: {}", file_path.display()).bold());
    let shown_filter = if filter.is_empty() {
        "(any)".bright_black()
    } else {
        filter.normal()
    };
    println!(
        "  {} {}  {} {}",
        "Column:".bold(),
        column.cyan().bold(),
        "Value:".bold(),
        shown_filter
    );
    println!();

    let summary = &output.summary;
    if summary.rows_kept == 0 {
        println!("{}", "✗ No rows matched".yellow().bold());
    } else {
        println!(
            "{}",
            format!(
                "✓ Kept {} of {} rows",
                summary.rows_kept, summary.rows_scanned
            )
            .green()
            .bold()
        );
    }
    println!();

    println!("{}", "Images:".bold().underline());
    println!("  {} {}", "Found:".blue().bold(), summary.anchors_found);
    println!("  {} {}", "Kept:".blue().bold(), summary.images_kept);
    println!("  {} {}", "Embedded:".blue().bold(), summary.images_embedded);

    let skipped = summary.images_kept.saturating_sub(summary.images_embedded);
    if skipped > 0 {
        println!(
            "  {} {}",
            "Skipped:".yellow().bold(),
            format!("{} could not be embedded", skipped)
        );
    }
}

/// Print the response payload in JSON format
pub fn print_json(result: &FilterResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
