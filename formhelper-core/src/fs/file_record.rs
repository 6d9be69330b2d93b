//! `src/fs/file_record.rs`
//! ============================================================
//! Selected-file metadata.
//!
//! A [`FileHandle`] is what the host hands over after a file dialog or a drop;
//! a [`FileRecord`] is the immutable, classified entry a picker keeps.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use compact_str::CompactString;
use serde::Serialize;

use crate::fs::mime_type::{self, FileCategory};
use crate::util::humanize::format_bytes;

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique record identity. Removal and replacement go through this,
/// never through name equality: two selections of the same file are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordId(u64);

impl RecordId {
    fn next() -> Self {
        Self(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the bytes of a file live when the form is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Contents already in memory (browser `File` read, drop payload, tests).
    Memory(Bytes),

    /// Contents on disk, read at submit time.
    Path(PathBuf),

    /// Already uploaded elsewhere; only its hidden fields are submitted.
    Remote,
}

/// Raw intake from a file dialog or a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: CompactString,
    pub size: u64,
    pub source: FileSource,
}

impl FileHandle {
    /// In-memory handle; size is the payload length.
    pub fn from_bytes(name: impl Into<CompactString>, data: impl Into<Bytes>) -> Self {
        let data: Bytes = data.into();

        Self {
            name: name.into(),
            size: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    /// On-disk handle with a size reported by the caller (e.g. from metadata).
    pub fn from_path(path: impl Into<PathBuf>, size: u64) -> Self {
        let path: PathBuf = path.into();
        let name = CompactString::new(
            path.file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default(),
        );

        Self {
            name,
            size,
            source: FileSource::Path(path),
        }
    }

    /// Metadata-only handle. Submits as an empty file part.
    pub fn metadata_only(name: impl Into<CompactString>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            source: FileSource::Memory(Bytes::new()),
        }
    }
}

/// A file that was uploaded before the form was shown, with the hidden inputs
/// the server needs to keep it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExistingFile {
    pub name: CompactString,
    pub size: u64,
    pub link: Option<String>,
    pub fields: Vec<(CompactString, String)>,
}

/// One selected file as held by a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    id: RecordId,
    pub name: CompactString,
    pub size: u64,
    pub link: Option<String>,
    pub category: FileCategory,
    pub media_type: &'static str,
    pub source: FileSource,
    pub hidden_fields: Vec<(CompactString, String)>,
}

impl FileRecord {
    #[must_use]
    pub fn from_handle(handle: FileHandle) -> Self {
        let media_type: &'static str = mime_type::media_type_of(&handle.name);

        Self {
            id: RecordId::next(),
            category: mime_type::category_of_media_type(media_type),
            media_type,
            name: handle.name,
            size: handle.size,
            link: None,
            source: handle.source,
            hidden_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_existing(existing: ExistingFile) -> Self {
        let media_type: &'static str = mime_type::media_type_of(&existing.name);

        Self {
            id: RecordId::next(),
            category: mime_type::category_of_media_type(media_type),
            media_type,
            name: existing.name,
            size: existing.size,
            link: existing.link,
            source: FileSource::Remote,
            hidden_fields: existing.fields,
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self.source, FileSource::Remote)
    }

    #[must_use]
    pub fn formatted_size(&self) -> String {
        format_bytes(self.size)
    }

    /// Text shown in a file box: `"name (1.50 KB)"`.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.formatted_size())
    }
}
