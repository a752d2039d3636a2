//! desktidy - organize a cluttered directory into category folders
//!
//! This library classifies the immediate entries of a directory by filename
//! extension, plans conflict-free moves into category subfolders, executes
//! those moves with per-file fault isolation, records each run as a session,
//! and can roll a recorded session back while re-validating the filesystem
//! state. Configuration, session persistence and terminal output live in
//! their own modules around that core.

pub mod category;
pub mod cli;
pub mod config;
pub mod executor;
pub mod output;
pub mod paths;
pub mod planner;
pub mod rollback;
pub mod session;

pub use category::{Category, classify};
pub use config::{Config, ConfigError, ExclusionRules};
pub use executor::{ExecutionReport, Executor, MoveOutcome, SkipReason};
pub use planner::{Plan, PlannedMove, Planner, ScanError};
pub use rollback::{RollbackEngine, RollbackError, RollbackOutcome, RollbackReport, RollbackSkip};
pub use session::{ExecutedMove, JsonSessionStore, Session, SessionStore, StoreError};

pub use cli::{Cli, run};
