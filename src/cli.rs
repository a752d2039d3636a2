//! Command-line interface module for desktidy.
//!
//! This module owns the argument surface and the orchestration of one
//! command: load configuration, plan, execute, persist the session, and
//! report. The organizing and rollback logic itself lives in the engine
//! modules; everything here is wiring and presentation.

use crate::category::Category;
use crate::config::Config;
use crate::executor::{Executor, MoveOutcome};
use crate::output::OutputFormatter;
use crate::paths;
use crate::planner::Planner;
use crate::rollback::{RollbackEngine, RollbackOutcome};
use crate::session::{JsonSessionStore, Session, SessionStore};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// desktidy - organize a cluttered directory into category folders.
#[derive(Parser, Debug)]
#[command(name = "desktidy")]
#[command(version)]
#[command(about = "Organize a directory into category folders, with sessions and rollback", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move directory entries into category folders
    Organize {
        /// Directory to organize
        dir: PathBuf,

        /// Show the plan without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Comma-separated category labels to organize (default: all)
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,
    },

    /// Revert a recorded organizing session
    Rollback {
        /// Directory that was organized
        dir: PathBuf,

        /// Session id (or unique prefix) to revert; default is the most
        /// recent session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List recorded sessions for a directory
    Sessions {
        /// Directory that was organized
        dir: PathBuf,
    },

    /// Print the category labels
    Categories,
}

/// Executes one parsed command.
pub fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Organize {
            dir,
            dry_run,
            categories,
        } => {
            let base_dir = absolutize(&dir)?;
            organize(&base_dir, dry_run, categories.as_deref(), cli.config.as_deref())
        }
        Command::Rollback { dir, session } => {
            let base_dir = absolutize(&dir)?;
            rollback(&base_dir, session.as_deref())
        }
        Command::Sessions { dir } => {
            let base_dir = absolutize(&dir)?;
            list_sessions(&base_dir)
        }
        Command::Categories => {
            list_categories();
            Ok(())
        }
    }
}

/// Resolves a user-supplied directory against the current directory.
fn absolutize(dir: &Path) -> Result<PathBuf, String> {
    if dir.is_absolute() {
        return Ok(paths::normalize(dir));
    }
    let cwd = env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    Ok(paths::normalize(&cwd.join(dir)))
}

/// Resolves `--categories` labels into a category set.
fn parse_categories(labels: &[String]) -> Result<HashSet<Category>, String> {
    let mut enabled = HashSet::new();
    for label in labels {
        let trimmed = label.trim();
        let category = Category::from_folder_name(trimmed).ok_or_else(|| {
            format!(
                "Unknown category '{}'. Valid categories: {}",
                trimmed,
                Category::ALL.map(|c| c.folder_name()).join(", ")
            )
        })?;
        enabled.insert(category);
    }
    Ok(enabled)
}

/// Plans and (unless dry-run) performs one organizing run.
fn organize(
    base_dir: &Path,
    dry_run: bool,
    categories: Option<&[String]>,
    config_path: Option<&Path>,
) -> Result<(), String> {
    OutputFormatter::info(&format!("Organizing contents of: {}", base_dir.display()));

    let config = Config::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let enabled = match categories {
        Some(labels) => parse_categories(labels)?,
        None => config.enabled_set(),
    };
    let rules = config
        .compile()
        .map_err(|e| format!("Error compiling exclusion rules: {}", e))?;

    let plan = Planner::plan(base_dir, &enabled, &rules).map_err(|e| e.to_string())?;

    if dry_run {
        if plan.is_empty() {
            OutputFormatter::dry_run_notice("Nothing to organize.");
            return Ok(());
        }
        for planned in &plan.moves {
            let name = planned
                .from
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            OutputFormatter::plain(&format!(
                " - {} → {}/",
                name,
                planned.category.folder_name()
            ));
        }
        OutputFormatter::summary_table(&plan.counts_by_category(), plan.len());
        OutputFormatter::dry_run_notice("No entries were moved.");
        return Ok(());
    }

    let total = plan.len();
    let pb = OutputFormatter::create_progress_bar(total as u64);
    let report = Executor::execute_with_progress(plan, base_dir, |outcome| {
        if let MoveOutcome::Moved { to, .. } = outcome
            && let Some(name) = to.file_name()
        {
            pb.set_message(name.to_string_lossy().into_owned());
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    // Every run is recorded, even one that moved nothing.
    let store = JsonSessionStore::for_base_dir(base_dir);
    store
        .append(&report.session)
        .map_err(|e| e.to_string())?;

    OutputFormatter::success(&format!(
        "Moved {} of {} entries into category folders.",
        report.session.moves.len(),
        total
    ));
    if !report.skipped.is_empty() {
        OutputFormatter::warning(&format!("Skipped {} entries:", report.skipped.len()));
        for (path, reason) in &report.skipped {
            OutputFormatter::plain(&format!("   - {}: {}", path.display(), reason));
        }
    }
    OutputFormatter::plain(&format!(
        "Session {} recorded. Run 'desktidy rollback {}' to revert.",
        report.session.short_id(),
        base_dir.display()
    ));

    Ok(())
}

/// Reverts a recorded session, by id or the most recent one.
fn rollback(base_dir: &Path, session_id: Option<&str>) -> Result<(), String> {
    let store = JsonSessionStore::for_base_dir(base_dir);
    let session = find_session(&store, session_id)?;

    OutputFormatter::info(&format!(
        "Rolling back session {} ({} recorded moves)",
        session.short_id(),
        session.moves.len()
    ));

    let report = RollbackEngine::rollback(&session).map_err(|e| e.to_string())?;

    OutputFormatter::success(&format!("Restored {} entries.", report.restored()));
    for outcome in &report.outcomes {
        match outcome {
            RollbackOutcome::Restored {
                to,
                conflict_adjusted: true,
                ..
            } => {
                OutputFormatter::warning(&format!(
                    "Original location was occupied; restored to {}",
                    to.display()
                ));
            }
            RollbackOutcome::Skipped { path, reason } => {
                OutputFormatter::plain(&format!("   - skipped {}: {}", path.display(), reason));
            }
            RollbackOutcome::Restored { .. } => {}
        }
    }
    if report.skipped() > 0 {
        OutputFormatter::warning(&format!("{} recorded moves were skipped.", report.skipped()));
    }

    Ok(())
}

/// Picks the session to revert: exact id, unique prefix, or latest.
fn find_session(store: &JsonSessionStore, id: Option<&str>) -> Result<Session, String> {
    let mut sessions = store.list().map_err(|e| e.to_string())?;
    match id {
        Some(id) => {
            let mut matches = sessions
                .into_iter()
                .filter(|s| s.id == id || s.id.starts_with(id));
            match (matches.next(), matches.next()) {
                (Some(session), None) => Ok(session),
                (Some(_), Some(_)) => Err(format!(
                    "Session id '{}' is ambiguous; use a longer prefix",
                    id
                )),
                (None, _) => Err(format!("Session '{}' not found", id)),
            }
        }
        None => sessions
            .pop()
            .ok_or_else(|| "No recorded sessions to roll back".to_string()),
    }
}

/// Prints the recorded sessions for a directory, oldest first.
fn list_sessions(base_dir: &Path) -> Result<(), String> {
    let store = JsonSessionStore::for_base_dir(base_dir);
    let sessions = store.list().map_err(|e| e.to_string())?;

    if sessions.is_empty() {
        OutputFormatter::plain("No recorded sessions.");
        return Ok(());
    }

    OutputFormatter::header(&format!("Sessions for {}", base_dir.display()));
    for session in &sessions {
        OutputFormatter::session_entry(session);
    }
    Ok(())
}

fn list_categories() {
    for category in Category::ALL {
        OutputFormatter::plain(category.folder_name());
    }
}
