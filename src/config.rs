//! Category enablement and exclusion-rule configuration.
//!
//! Configuration is loaded from TOML and controls two things: which
//! categories get organized, and which entry names are left alone. Hidden
//! names (leading `.`) are always left alone by the planner and have no
//! toggle here.
//!
//! # Configuration File Format
//!
//! ```toml
//! enabled_categories = ["Images", "Documents", "Videos"]
//!
//! [exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.tmp"]
//! extensions = ["bak"]
//! regex = []
//!
//! [include]
//! patterns = ["important.tmp"]
//! ```
//!
//! Omitted keys fall back to their defaults: every category enabled, no
//! exclusions.

use crate::category::Category;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    NotFound(PathBuf),
    /// Invalid TOML syntax or structure, including unknown category labels.
    Invalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::Io(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// User configuration, as deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Categories the planner may move entries into. Defaults to all.
    #[serde(default = "default_enabled_categories")]
    pub enabled_categories: Vec<Category>,

    /// Rules for excluding entries from organization.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries, overriding exclude rules.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enabled_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}

/// Rules for excluding entries from organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact names to exclude (e.g., "Thumbs.db", "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp", "Screenshot*").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "bak", "tmp", "log").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns to exclude (for advanced users).
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.desktidy.toml` in the current directory
    /// 3. Look for `~/.config/desktidy/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".desktidy.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("desktidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The enabled categories as a set, for planner lookups.
    pub fn enabled_set(&self) -> HashSet<Category> {
        self.enabled_categories.iter().copied().collect()
    }

    /// Compile the name rules into matcher structures.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(self) -> Result<ExclusionRules, ConfigError> {
        ExclusionRules::new(self.exclude, self.include)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled_categories: default_enabled_categories(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Pre-compiled exclusion rules for matching entry names.
///
/// Glob and regex patterns are compiled once here so that matching during a
/// scan is a lookup, not a reparse.
pub struct ExclusionRules {
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl ExclusionRules {
    fn new(exclude: ExcludeRules, include: IncludeRules) -> Result<Self, ConfigError> {
        let exclude_patterns = exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let include_patterns = include
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_filenames: exclude.filenames.into_iter().collect(),
            exclude_extensions: exclude
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if an entry name passes the rules.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Exact name match - if matched, exclude
    /// 3. Extension match - if matched, exclude
    /// 4. Glob pattern match - if matched, exclude
    /// 5. Regex pattern match - if matched, exclude
    /// 6. Default: include
    pub fn should_include(&self, name: &str) -> bool {
        if self.include_patterns.iter().any(|p| p.matches(name)) {
            return true;
        }

        if self.exclude_filenames.contains(name) {
            return false;
        }

        if let Some((stem, ext)) = name.rsplit_once('.')
            && !stem.is_empty()
            && self.exclude_extensions.contains(&ext.to_lowercase())
        {
            return false;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(name)) {
            return false;
        }

        if self.exclude_regexes.iter().any(|r| r.is_match(name)) {
            return false;
        }

        true
    }
}
