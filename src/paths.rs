//! Path normalization, containment checks and conflict-free naming.
//!
//! Every move performed or reverted by this crate must stay inside the
//! directory being organized. The checks here are purely lexical: paths are
//! normalized component by component without touching the filesystem, so a
//! crafted `..` segment cannot escape the base directory between validation
//! and use.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Upper bound on ` (N)` probes when searching for an unoccupied name.
pub const CONFLICT_PROBE_LIMIT: u32 = 1000;

/// Normalizes a path lexically, resolving `.` and `..` components.
///
/// No filesystem access takes place and symlinks are not resolved; the
/// result is the path's canonical component spelling, not its canonical
/// target.
///
/// # Examples
///
/// ```
/// use desktidy::paths::normalize;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
/// assert_eq!(normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
/// ```
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Returns `true` if `path` normalizes to a location strictly inside `base`.
///
/// Containment is component-wise (`Path::starts_with`), so `/tmp/abc` is not
/// inside `/tmp/ab`. The base directory itself does not count as inside.
pub fn is_within(path: &Path, base: &Path) -> bool {
    let path = normalize(path);
    let base = normalize(base);
    path != base && path.starts_with(&base)
}

/// The ` (N)` probe hit [`CONFLICT_PROBE_LIMIT`] without finding a free name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictExhausted {
    pub target: PathBuf,
}

impl fmt::Display for ConflictExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no free name near '{}' after {} attempts",
            self.target.display(),
            CONFLICT_PROBE_LIMIT
        )
    }
}

impl std::error::Error for ConflictExhausted {}

/// Finds an unoccupied path at or near `target`.
///
/// An unoccupied `target` is returned unchanged. Otherwise a counter is
/// inserted before the extension (`report (1).pdf`) or appended when the
/// name has no extension (`notes (1)`), probing upward from 1 until a free
/// path is found or the probe limit is reached.
pub fn resolve_conflict(target: &Path) -> Result<PathBuf, ConflictExhausted> {
    if !target.exists() {
        return Ok(target.to_path_buf());
    }

    let file_name = match target.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            return Err(ConflictExhausted {
                target: target.to_path_buf(),
            });
        }
    };
    let parent = target.parent().unwrap_or_else(|| Path::new(""));

    // A leading dot marks a hidden name, not an extension boundary, so
    // `.gitignore` counts as extensionless and probes to `.gitignore (1)`.
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name.as_str(), None),
    };

    for counter in 1..=CONFLICT_PROBE_LIMIT {
        let candidate_name = match extension {
            Some(ext) => format!("{stem} ({counter}).{ext}"),
            None => format!("{stem} ({counter})"),
        };
        let candidate = parent.join(candidate_name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(ConflictExhausted {
        target: target.to_path_buf(),
    })
}
