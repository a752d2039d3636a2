//! Plan execution with per-move fault isolation.
//!
//! The executor takes a [`Plan`] and performs its moves, re-validating the
//! world as it goes: paths are checked against the base directory, sources
//! are re-checked for existence, destination conflicts are resolved at the
//! moment of the rename. One failing move never aborts the batch; the
//! contract is best-effort with a full accounting. Execution always yields a
//! [`Session`], possibly with zero moves, ready to be persisted.

use crate::category::Category;
use crate::paths;
use crate::planner::{Plan, PlannedMove};
use crate::session::{ExecutedMove, Session};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Why a planned move was not performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The move's source or destination falls outside the base directory.
    OutsideBase,
    /// The source vanished between planning and execution.
    SourceMissing,
    /// The category folder path is occupied by a non-directory.
    FolderObstructed,
    /// No free destination name within the probe limit.
    ConflictExhausted,
    /// The move failed with an OS error.
    Io(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OutsideBase => write!(f, "path falls outside the base directory"),
            SkipReason::SourceMissing => write!(f, "source no longer exists"),
            SkipReason::FolderObstructed => {
                write!(f, "category folder path is occupied by a non-directory")
            }
            SkipReason::ConflictExhausted => write!(f, "no free destination name available"),
            SkipReason::Io(msg) => write!(f, "{}", msg),
        }
    }
}

/// Outcome of one planned move.
#[derive(Debug, Clone)]
pub enum MoveOutcome {
    /// The entry was moved; `to` is the conflict-resolved destination.
    Moved { from: PathBuf, to: PathBuf },
    /// The move was not performed.
    Skipped { from: PathBuf, reason: SkipReason },
}

/// Everything one execution run produced.
#[derive(Debug)]
pub struct ExecutionReport {
    /// Record of the moves actually performed, in execution order.
    pub session: Session,
    /// Planned moves that were not performed, with reasons.
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

impl ExecutionReport {
    /// True when every planned move was performed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Performs the moves of a plan inside a base directory.
pub struct Executor;

impl Executor {
    /// Executes `plan` against `base_dir`.
    ///
    /// Never fails as a whole: per-move problems become entries in the
    /// report's `skipped` list and the returned session records whatever
    /// was actually moved.
    pub fn execute(plan: Plan, base_dir: &Path) -> ExecutionReport {
        Self::execute_with_progress(plan, base_dir, |_| {})
    }

    /// Like [`Executor::execute`], invoking `observer` once per planned
    /// move as its outcome is decided. The callback drives progress
    /// reporting in the CLI.
    pub fn execute_with_progress<F>(plan: Plan, base_dir: &Path, mut observer: F) -> ExecutionReport
    where
        F: FnMut(&MoveOutcome),
    {
        let mut executed: Vec<ExecutedMove> = Vec::new();
        let mut skipped: Vec<(PathBuf, SkipReason)> = Vec::new();

        // Drop anything that escapes the base directory before touching
        // the filesystem at all.
        let mut admitted: Vec<PlannedMove> = Vec::new();
        for planned in plan.moves {
            if !paths::is_within(&planned.from, base_dir)
                || !paths::is_within(&planned.to, base_dir)
            {
                warn!(
                    "Dropping move {:?} -> {:?}: outside base directory",
                    planned.from, planned.to
                );
                let outcome = MoveOutcome::Skipped {
                    from: planned.from,
                    reason: SkipReason::OutsideBase,
                };
                observer(&outcome);
                if let MoveOutcome::Skipped { from, reason } = outcome {
                    skipped.push((from, reason));
                }
                continue;
            }
            admitted.push(planned);
        }

        for (category, batch) in group_by_category(admitted) {
            let folder = base_dir.join(category.folder_name());
            if let Err(reason) = ensure_category_folder(&folder) {
                warn!("Cannot materialize {:?}: {}", folder, reason);
                for planned in batch {
                    let outcome = MoveOutcome::Skipped {
                        from: planned.from,
                        reason: reason.clone(),
                    };
                    observer(&outcome);
                    if let MoveOutcome::Skipped { from, reason } = outcome {
                        skipped.push((from, reason));
                    }
                }
                continue;
            }

            for planned in batch {
                let outcome = perform_move(planned);
                observer(&outcome);
                match outcome {
                    MoveOutcome::Moved { from, to } => {
                        debug!("Moved {:?} -> {:?}", from, to);
                        executed.push(ExecutedMove { from, to });
                    }
                    MoveOutcome::Skipped { from, reason } => {
                        warn!("Skipped {:?}: {}", from, reason);
                        skipped.push((from, reason));
                    }
                }
            }
        }

        ExecutionReport {
            session: Session::new(base_dir.to_path_buf(), executed),
            skipped,
        }
    }
}

/// Partitions moves by category, keeping first-seen category order and the
/// plan's order within each category.
fn group_by_category(moves: Vec<PlannedMove>) -> Vec<(Category, Vec<PlannedMove>)> {
    let mut groups: Vec<(Category, Vec<PlannedMove>)> = Vec::new();
    for planned in moves {
        match groups.iter_mut().find(|(c, _)| *c == planned.category) {
            Some((_, batch)) => batch.push(planned),
            None => groups.push((planned.category, vec![planned])),
        }
    }
    groups
}

/// Makes sure the category folder exists as a directory.
fn ensure_category_folder(folder: &Path) -> Result<(), SkipReason> {
    match fs::metadata(folder) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SkipReason::FolderObstructed),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(folder).map_err(|e| SkipReason::Io(e.to_string()))
        }
        Err(e) => Err(SkipReason::Io(e.to_string())),
    }
}

/// Carries out a single admitted move, isolated from the rest of the batch.
fn perform_move(planned: PlannedMove) -> MoveOutcome {
    let PlannedMove { from, to, .. } = planned;

    if !from.exists() {
        return MoveOutcome::Skipped {
            from,
            reason: SkipReason::SourceMissing,
        };
    }

    let destination = match paths::resolve_conflict(&to) {
        Ok(path) => path,
        Err(_) => {
            return MoveOutcome::Skipped {
                from,
                reason: SkipReason::ConflictExhausted,
            };
        }
    };

    match fs::rename(&from, &destination) {
        Ok(()) => MoveOutcome::Moved {
            from,
            to: destination,
        },
        Err(e) => MoveOutcome::Skipped {
            from,
            reason: SkipReason::Io(e.to_string()),
        },
    }
}
