//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored
//! output, progress tracking and formatted tables. Diagnostics go through
//! `tracing`; everything a user is meant to read goes through here.

use crate::category::Category;
use crate::session::Session;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for move batches
/// - Summary tables and session listings
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates and returns a progress bar for a move batch.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use desktidy::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("Completed!");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a summary table of planned or performed moves by category.
    ///
    /// Counts are shown in the order given, which the planner keeps
    /// deterministic (first appearance in the directory listing).
    pub fn summary_table(category_counts: &[(Category, usize)], total: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .iter()
            .map(|(category, _)| category.folder_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Entries".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            let word = if *count == 1 { "entry" } else { "entries" };
            println!(
                "{:<width$} | {} {}",
                category.folder_name(),
                count.to_string().green(),
                word,
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            if total == 1 { "entry" } else { "entries" },
            width = max_category_len
        );
    }

    /// Prints one line of a session listing: short id, timestamp, size.
    pub fn session_entry(session: &Session) {
        let word = if session.moves.len() == 1 {
            "file"
        } else {
            "files"
        };
        println!(
            "{}  {}  {} {} moved",
            session.short_id().bold(),
            session
                .created_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
                .cyan(),
            session.moves.len(),
            word
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
