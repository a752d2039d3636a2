//! Move planning for a single directory level.
//!
//! The planner lists the immediate entries of the directory being organized
//! and decides, entry by entry, whether a move is wanted and where it should
//! go. It never touches the filesystem beyond the one listing; the resulting
//! [`Plan`] is advice for the executor, which re-validates everything at
//! execution time.

use crate::category::{self, Category};
use crate::config::ExclusionRules;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A single move the executor should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Current location of the entry.
    pub from: PathBuf,
    /// Planned destination, before conflict resolution.
    pub to: PathBuf,
    /// The category whose folder the entry moves into.
    pub category: Category,
}

/// The ordered set of moves produced by one scan.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// Planned moves, in directory-listing order.
    pub moves: Vec<PlannedMove>,
}

impl Plan {
    /// Number of planned moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True when nothing needs organizing.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Per-category move counts, in first-seen order.
    pub fn counts_by_category(&self) -> Vec<(Category, usize)> {
        let mut counts: Vec<(Category, usize)> = Vec::new();
        for planned in &self.moves {
            match counts.iter_mut().find(|(c, _)| *c == planned.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((planned.category, 1)),
            }
        }
        counts
    }
}

/// The directory to organize could not be listed.
#[derive(Debug)]
pub struct ScanError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to read directory {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for ScanError {}

/// Computes a [`Plan`] from one directory listing.
pub struct Planner;

impl Planner {
    /// Scans the immediate entries of `base_dir` and plans their moves.
    ///
    /// Entries are skipped when any of the following holds:
    /// - the name starts with `.` (hidden entries, including the session
    ///   history file, are never organized)
    /// - the entry is a directory named exactly like a category folder
    /// - the configured exclusion rules reject the name
    /// - the entry's category is not in `enabled`
    /// - the move would be a no-op (the entry already sits in, or is, its
    ///   own destination folder)
    ///
    /// Directories classify as [`Category::Folders`]; files classify by
    /// extension. Listing order is preserved in the plan. Failure to list
    /// the directory is the only error; individual odd entries are skipped
    /// with a logged warning.
    pub fn plan(
        base_dir: &Path,
        enabled: &HashSet<Category>,
        rules: &ExclusionRules,
    ) -> Result<Plan, ScanError> {
        let entries = fs::read_dir(base_dir).map_err(|e| ScanError {
            path: base_dir.to_path_buf(),
            source: e,
        })?;

        let mut moves = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();

            if name.starts_with('.') {
                debug!("Skipping hidden entry: {}", name);
                continue;
            }

            let Ok(file_type) = entry.file_type() else {
                warn!("Skipping {}: could not determine entry type", name);
                continue;
            };

            if file_type.is_dir() && Category::is_reserved_name(&name) {
                debug!("Skipping category folder: {}", name);
                continue;
            }

            if !rules.should_include(&name) {
                debug!("Skipping excluded entry: {}", name);
                continue;
            }

            let category = if file_type.is_dir() {
                Category::Folders
            } else {
                category::classify(&name)
            };

            if !enabled.contains(&category) {
                debug!("Skipping {} ({} disabled)", name, category);
                continue;
            }

            let from = entry.path();
            let destination_folder = base_dir.join(category.folder_name());
            let to = destination_folder.join(&name);

            if from == to || from.starts_with(&destination_folder) {
                debug!("Skipping {}: already at its destination", name);
                continue;
            }

            moves.push(PlannedMove { from, to, category });
        }

        Ok(Plan { moves })
    }
}
