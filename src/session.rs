//! Session records and their persistent store.
//!
//! Every organizing run produces a [`Session`]: the list of moves actually
//! performed, with enough context to invert them later. Sessions are
//! persisted through the [`SessionStore`] trait; the shipped implementation
//! keeps a JSON array in a hidden file inside the organized directory, which
//! the planner skips like any other dotfile. The store is append-only:
//! rolling a session back does not remove it from the history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the per-directory session history file.
pub const SESSION_FILE_NAME: &str = ".desktidy_sessions.json";

/// A single move performed by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedMove {
    /// Where the entry was before the move.
    pub from: PathBuf,
    /// The destination actually used, after conflict resolution.
    pub to: PathBuf,
}

/// The durable record of one organizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this run.
    pub id: String,
    /// When the run happened.
    pub created_at: DateTime<Utc>,
    /// The directory that was organized. Rollback validates every recorded
    /// path against this boundary.
    pub base_dir: PathBuf,
    /// Moves performed, in execution order.
    pub moves: Vec<ExecutedMove>,
}

impl Session {
    /// Creates a session with a fresh id and the current timestamp.
    pub fn new(base_dir: PathBuf, moves: Vec<ExecutedMove>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            created_at: Utc::now(),
            base_dir,
            moves,
        }
    }

    /// First eight characters of the id, for listings and log lines.
    pub fn short_id(&self) -> &str {
        // Ids read back from the store are not guaranteed to be ASCII.
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }
}

/// Errors raised by session persistence.
#[derive(Debug)]
pub enum StoreError {
    /// The session file exists but could not be read.
    Read { path: PathBuf, source: io::Error },
    /// The session file could not be written.
    Write { path: PathBuf, source: io::Error },
    /// The session file contents are not a valid session list.
    Malformed { path: PathBuf, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Failed to read session file {}: {}", path.display(), source)
            }
            Self::Write { path, source } => {
                write!(f, "Failed to write session file {}: {}", path.display(), source)
            }
            Self::Malformed { path, reason } => {
                write!(f, "Invalid session file {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistence seam for session records.
///
/// Implementations must be append-only from the caller's point of view:
/// `append` never drops previously stored sessions, and nothing here
/// deletes.
pub trait SessionStore {
    /// Adds a session to the store.
    fn append(&self, session: &Session) -> Result<(), StoreError>;

    /// Looks up a session by its full id.
    fn get(&self, id: &str) -> Result<Option<Session>, StoreError>;

    /// Returns all stored sessions, oldest first.
    fn list(&self) -> Result<Vec<Session>, StoreError>;
}

/// [`SessionStore`] backed by a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    /// Creates a store over an explicit file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates the store for a directory being organized, using the hidden
    /// history file inside it.
    pub fn for_base_dir(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(SESSION_FILE_NAME),
        }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole session list. A missing file is an empty history.
    fn read_all(&self) -> Result<Vec<Session>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| StoreError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

impl SessionStore for JsonSessionStore {
    fn append(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.read_all()?;
        sessions.push(session.clone());
        let json =
            serde_json::to_string_pretty(&sessions).map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
            })?;
        fs::write(&self.path, json).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.read_all()?.into_iter().find(|s| s.id == id))
    }

    fn list(&self) -> Result<Vec<Session>, StoreError> {
        self.read_all()
    }
}
