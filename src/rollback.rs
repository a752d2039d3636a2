//! Reversal of a recorded organizing session.
//!
//! Rollback inverts a session's moves: each entry is moved from its
//! organized location back to where it came from, walking the records in
//! the order they were stored. The filesystem
//! may have changed since the session was recorded, so every step is
//! re-validated: the organized entry may be gone, the original slot may be
//! occupied or hold a different kind of entry, and recorded paths are
//! checked against the session's base directory just like at execution
//! time. Problems with one entry never abort the rest.

use crate::paths;
use crate::session::Session;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Why a recorded move was not reverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackSkip {
    /// A recorded path falls outside the session's base directory.
    OutsideBase,
    /// The organized entry no longer exists at its recorded location.
    DestinationMissing,
    /// The original slot now holds a different kind of entry than the one
    /// being restored.
    TypeMismatch,
    /// No free name near the original location within the probe limit.
    ConflictExhausted,
    /// The restore failed with an OS error.
    Io(String),
}

impl fmt::Display for RollbackSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackSkip::OutsideBase => write!(f, "path falls outside the base directory"),
            RollbackSkip::DestinationMissing => {
                write!(f, "entry no longer exists at its organized location")
            }
            RollbackSkip::TypeMismatch => {
                write!(f, "original location now holds a different kind of entry")
            }
            RollbackSkip::ConflictExhausted => {
                write!(f, "no free name available near the original location")
            }
            RollbackSkip::Io(msg) => write!(f, "{}", msg),
        }
    }
}

/// Outcome of reverting one recorded move.
#[derive(Debug, Clone)]
pub enum RollbackOutcome {
    /// The entry was moved back. `to` is where it now lives; when the
    /// original slot was occupied, `to` is a conflict-adjusted neighbour of
    /// it and `conflict_adjusted` is set.
    Restored {
        from: PathBuf,
        to: PathBuf,
        conflict_adjusted: bool,
    },
    /// The recorded move was not reverted.
    Skipped { path: PathBuf, reason: RollbackSkip },
}

/// Per-move accounting for one rollback run, in stored move order.
#[derive(Debug, Default)]
pub struct RollbackReport {
    pub outcomes: Vec<RollbackOutcome>,
}

impl RollbackReport {
    /// Number of entries moved back.
    pub fn restored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RollbackOutcome::Restored { .. }))
            .count()
    }

    /// Number of recorded moves that were skipped.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.restored()
    }

    /// True when every recorded move was reverted, none with adjustment.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| {
            matches!(
                o,
                RollbackOutcome::Restored {
                    conflict_adjusted: false,
                    ..
                }
            )
        })
    }
}

/// The session itself is unusable, before any move is attempted.
#[derive(Debug)]
pub enum RollbackError {
    /// The session's base directory is not an absolute path.
    RelativeBaseDir { path: PathBuf },
    /// The session's base directory is missing or not a directory.
    MissingBaseDir { path: PathBuf },
}

impl fmt::Display for RollbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackError::RelativeBaseDir { path } => {
                write!(
                    f,
                    "Session base directory is not absolute: {}",
                    path.display()
                )
            }
            RollbackError::MissingBaseDir { path } => {
                write!(
                    f,
                    "Session base directory is missing or not a directory: {}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for RollbackError {}

/// Reverts recorded sessions.
pub struct RollbackEngine;

impl RollbackEngine {
    /// Reverts every move of `session`, in the order they were recorded.
    ///
    /// Errors only when the session is structurally unusable (relative or
    /// missing base directory). Everything else, including a session whose
    /// moves were all undone by hand already, yields a report.
    pub fn rollback(session: &Session) -> Result<RollbackReport, RollbackError> {
        if !session.base_dir.is_absolute() {
            return Err(RollbackError::RelativeBaseDir {
                path: session.base_dir.clone(),
            });
        }
        if !session.base_dir.is_dir() {
            return Err(RollbackError::MissingBaseDir {
                path: session.base_dir.clone(),
            });
        }

        let mut report = RollbackReport::default();
        for record in &session.moves {
            let outcome = Self::revert_move(&record.from, &record.to, &session.base_dir);
            match &outcome {
                RollbackOutcome::Restored { from, to, .. } => {
                    debug!("Restored {:?} -> {:?}", from, to);
                }
                RollbackOutcome::Skipped { path, reason } => {
                    warn!("Skipped {:?}: {}", path, reason);
                }
            }
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    /// Reverts one recorded move: the entry currently at `to` goes back to
    /// `from`, or to a free name near it.
    fn revert_move(from: &Path, to: &Path, base_dir: &Path) -> RollbackOutcome {
        if !paths::is_within(to, base_dir) {
            return RollbackOutcome::Skipped {
                path: to.to_path_buf(),
                reason: RollbackSkip::OutsideBase,
            };
        }
        if !paths::is_within(from, base_dir) {
            return RollbackOutcome::Skipped {
                path: from.to_path_buf(),
                reason: RollbackSkip::OutsideBase,
            };
        }

        let moved_meta = match fs::metadata(to) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return RollbackOutcome::Skipped {
                    path: to.to_path_buf(),
                    reason: RollbackSkip::DestinationMissing,
                };
            }
            Err(e) => {
                return RollbackOutcome::Skipped {
                    path: to.to_path_buf(),
                    reason: RollbackSkip::Io(e.to_string()),
                };
            }
        };

        let (restore_target, conflict_adjusted) = match fs::metadata(from) {
            Ok(original_meta) => {
                if original_meta.is_dir() != moved_meta.is_dir() {
                    return RollbackOutcome::Skipped {
                        path: from.to_path_buf(),
                        reason: RollbackSkip::TypeMismatch,
                    };
                }
                // Something of the same kind reoccupied the original slot;
                // restore next to it rather than on top of it.
                match paths::resolve_conflict(from) {
                    Ok(adjusted) => (adjusted, true),
                    Err(_) => {
                        return RollbackOutcome::Skipped {
                            path: from.to_path_buf(),
                            reason: RollbackSkip::ConflictExhausted,
                        };
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (from.to_path_buf(), false),
            Err(e) => {
                return RollbackOutcome::Skipped {
                    path: from.to_path_buf(),
                    reason: RollbackSkip::Io(e.to_string()),
                };
            }
        };

        match fs::rename(to, &restore_target) {
            Ok(()) => RollbackOutcome::Restored {
                from: to.to_path_buf(),
                to: restore_target,
                conflict_adjusted,
            },
            Err(e) => RollbackOutcome::Skipped {
                path: to.to_path_buf(),
                reason: RollbackSkip::Io(e.to_string()),
            },
        }
    }
}
