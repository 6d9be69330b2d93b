//! `src/fs/mime_type.rs`
//! ============================================================
//! Filename → media type → coarse [`FileCategory`].
//!
//! The category drives the icon shown next to a selected file. Media types are
//! resolved through the `mime_guess` registry and matched against an ordered
//! prefix rule list: general types, Microsoft Office, OpenDocument, archives,
//! source code. First match wins; anything unresolved is [`FileCategory::File`].

use serde::{Deserialize, Serialize};

/// Media type used when an extension is unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

// ------------------------------------------------------------
// FileCategory
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Pdf,
    Word,
    Excel,
    Powerpoint,
    Archive,
    Code,
    Font,
    Csv,
    Xml,
    File,
}

impl FileCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Excel => "excel",
            Self::Powerpoint => "powerpoint",
            Self::Archive => "archive",
            Self::Code => "code",
            Self::Font => "font",
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ------------------------------------------------------------
// Category rules, first match wins
// ------------------------------------------------------------

const CATEGORY_RULES: &[(&str, FileCategory)] = &[
    // General
    ("image", FileCategory::Image),
    ("audio", FileCategory::Audio),
    ("video", FileCategory::Video),
    ("font", FileCategory::Font),
    ("text/csv", FileCategory::Csv),
    ("text/xml", FileCategory::Xml),
    ("application/xml", FileCategory::Xml),
    ("application/pdf", FileCategory::Pdf),
    // Microsoft
    ("application/msword", FileCategory::Word),
    ("application/vnd.ms-excel", FileCategory::Excel),
    ("application/vnd.ms-powerpoint", FileCategory::Powerpoint),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        FileCategory::Word,
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        FileCategory::Excel,
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        FileCategory::Powerpoint,
    ),
    // OpenDocument
    ("application/vnd.oasis.opendocument.text", FileCategory::Word),
    ("application/vnd.oasis.opendocument.spreadsheet", FileCategory::Excel),
    ("application/vnd.oasis.opendocument.presentation", FileCategory::Powerpoint),
    // Archive
    ("application/zip", FileCategory::Archive),
    ("application/gzip", FileCategory::Archive),
    ("application/x-gzip", FileCategory::Archive),
    ("application/x-compressed", FileCategory::Archive),
    ("application/x-tar", FileCategory::Archive),
    ("application/x-bzip", FileCategory::Archive),
    ("application/x-7z-compressed", FileCategory::Archive),
    ("application/x-rar-compressed", FileCategory::Archive),
    ("application/vnd.rar", FileCategory::Archive),
    // Code
    ("text/javascript", FileCategory::Code),
    ("application/json", FileCategory::Code),
    ("application/x-httpd-php", FileCategory::Code),
    ("application/x-sh", FileCategory::Code),
    ("application/x-csh", FileCategory::Code),
    ("application/javascript", FileCategory::Code),
];

/// Lower-cased extension of the last path component.
///
/// A name without a dot is treated as a bare extension (`"docx"` resolves like
/// `"a.docx"`), matching how browsers' `accept` lookups behave.
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    let base: &str = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let ext: &str = base.rsplit('.').next().unwrap_or(base);

    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// Resolve a filename to its media type, if the extension is known.
#[must_use]
pub fn lookup_media_type(filename: &str) -> Option<&'static str> {
    let ext: String = extension_of(filename)?;

    mime_guess::from_ext(&ext).first_raw()
}

/// Media type for a filename, falling back to `application/octet-stream`.
#[must_use]
pub fn media_type_of(filename: &str) -> &'static str {
    lookup_media_type(filename).unwrap_or(OCTET_STREAM)
}

/// Category for an already-resolved media type.
#[must_use]
pub fn category_of_media_type(media_type: &str) -> FileCategory {
    CATEGORY_RULES
        .iter()
        .find(|(prefix, _)| media_type.starts_with(prefix))
        .map_or(FileCategory::File, |(_, category)| *category)
}

/// Classify a filename. Total: unknown names classify as [`FileCategory::File`].
#[must_use]
pub fn classify(filename: &str) -> FileCategory {
    category_of_media_type(media_type_of(filename))
}
