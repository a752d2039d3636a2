//! File classification by filename extension.
//!
//! This module defines the closed set of category labels used to name the
//! destination folders, and a pure classifier that maps a filename to a
//! category based on its extension alone. File contents are never inspected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category label for grouping directory entries.
///
/// The label text doubles as the on-disk folder name, so the variants form a
/// stable public contract: new extensions may be added to the classifier, but
/// labels are never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Image files (PNG, JPG, SVG, etc.)
    Images,
    /// Document files (PDF, DOCX, TXT, etc.)
    Documents,
    /// Video files (MP4, MKV, MOV, etc.)
    Videos,
    /// Audio files (MP3, FLAC, WAV, etc.)
    Audio,
    /// Archive files (ZIP, RAR, 7Z, etc.)
    Archives,
    /// Source code and markup files (RS, PY, JSON, etc.)
    Code,
    /// Shortcut and launcher files (LNK, URL, DESKTOP)
    Shortcuts,
    /// Executable and installer files (EXE, MSI, DEB, etc.)
    Executables,
    /// Font files (TTF, OTF, WOFF, etc.)
    Fonts,
    /// Subdirectories of the organized directory
    Folders,
    /// Everything the classifier does not recognize
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 11] = [
        Category::Images,
        Category::Documents,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Code,
        Category::Shortcuts,
        Category::Executables,
        Category::Fonts,
        Category::Folders,
        Category::Other,
    ];

    /// Returns the destination folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use desktidy::category::Category;
    ///
    /// assert_eq!(Category::Images.folder_name(), "Images");
    /// assert_eq!(Category::Other.folder_name(), "Other");
    /// ```
    pub fn folder_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Shortcuts => "Shortcuts",
            Category::Executables => "Executables",
            Category::Fonts => "Fonts",
            Category::Folders => "Folders",
            Category::Other => "Other",
        }
    }

    /// Resolves a folder name back to its category.
    ///
    /// The lookup is exact; label names are case-sensitive on disk.
    pub fn from_folder_name(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.folder_name() == name)
    }

    /// Returns `true` if `name` is one of the category folder names.
    ///
    /// Directory entries with a reserved name are left in place by the
    /// planner so that a second organizing pass never relocates the folders
    /// created by the first.
    pub fn is_reserved_name(name: &str) -> bool {
        Category::from_folder_name(name).is_some()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Classifies a filename by its extension.
///
/// The extension is the text after the final `.`, compared
/// case-insensitively. Names without an extension, dotfiles whose only `.`
/// leads the name, and unrecognized extensions all map to
/// [`Category::Other`]. The classifier never returns [`Category::Folders`];
/// that label is assigned by the planner to directory entries.
///
/// # Examples
///
/// ```
/// use desktidy::category::{Category, classify};
///
/// assert_eq!(classify("photo.JPG"), Category::Images);
/// assert_eq!(classify("archive.tar.gz"), Category::Archives);
/// assert_eq!(classify(".bashrc"), Category::Other);
/// assert_eq!(classify("README"), Category::Other);
/// ```
pub fn classify(filename: &str) -> Category {
    let Some(ext) = extension_of(filename) else {
        return Category::Other;
    };
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" | "bmp" | "ico" => Category::Images,
        "pdf" | "doc" | "docx" | "txt" | "xlsx" | "xls" | "ppt" | "pptx" | "odt" | "rtf" => {
            Category::Documents
        }
        "mp4" | "avi" | "mov" | "mkv" | "wmv" | "flv" => Category::Videos,
        "mp3" | "wav" | "flac" | "ogg" | "m4a" => Category::Audio,
        "zip" | "rar" | "7z" | "tar" | "gz" => Category::Archives,
        "js" | "ts" | "py" | "html" | "css" | "json" | "xml" | "java" | "cpp" | "c" | "cs"
        | "php" | "rb" | "go" | "rs" => Category::Code,
        "lnk" | "url" | "desktop" => Category::Shortcuts,
        "exe" | "msi" | "app" | "deb" | "rpm" => Category::Executables,
        "ttf" | "otf" | "woff" | "woff2" => Category::Fonts,
        _ => Category::Other,
    }
}

/// Extracts the extension from a filename, if it has one.
///
/// A trailing dot yields no extension, and a leading dot marks a hidden
/// name rather than an extension boundary.
fn extension_of(filename: &str) -> Option<&str> {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}
