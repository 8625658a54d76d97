//! Progress reporting for restore runs
//!
//! Provides a live spinner while the archive is scanned and a styled
//! header and summary around the run.

use crate::restore::RunSummary;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays scan status
#[derive(Clone)]
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &RunSummary) {
        self.bar.set_message(progress_message(progress));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn progress_message(progress: &RunSummary) -> String {
    format!(
        "Read: {} | Matched: {} | Rate: {:.0}/s",
        format_number(progress.records_read),
        format_number(progress.matched),
        progress.records_per_second(),
    )
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the restore run
pub fn print_summary(summary: &RunSummary, dry_run: bool) {
    let duration_secs = summary.elapsed.as_secs_f64();

    println!();
    if dry_run {
        println!("{}", style("Dry Run Complete").green().bold());
    } else {
        println!("{}", style("Restore Complete").green().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Records read:").bold(),
        format_number(summary.records_read)
    );
    println!(
        "  {} {}",
        style("Matched:").bold(),
        format_number(summary.matched)
    );
    println!(
        "  {} {}",
        style("Dispatched:").bold(),
        format_number(summary.dispatched)
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        summary.records_per_second()
    );
    println!();
}

/// Print a header at the start of the run
pub fn print_header(archive: &str, target: &str, workers: usize, pattern: &str, dry_run: bool) {
    println!();
    println!(
        "{} {}",
        style("cbfs-restore").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Archive:").bold(), archive);
    println!("  {} {}", style("Target:").bold(), target);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Match:").bold(), pattern);
    if dry_run {
        println!("  {} {}", style("Mode:").bold(), style("dry run").yellow());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_progress_message() {
        let progress = RunSummary {
            records_read: 12_500,
            matched: 2_000,
            dispatched: 2_000,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(
            progress_message(&progress),
            "Read: 12,500 | Matched: 2,000 | Rate: 1000/s"
        );
    }
}
