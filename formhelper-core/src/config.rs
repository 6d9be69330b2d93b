//! src/config.rs
//! ============================================================================
//! # Config: Form and Picker Configuration
//!
//! Process-wide defaults for every picker, the form-wide aggregate limits and
//! the message table. Loads and saves as TOML; every struct is
//! `#[serde(default)]`, so a file only needs the keys it changes.
//!
//! Per-picker customization goes through [`PickerOverrides`] and the explicit
//! [`Merge`] implementation: an override wins, an absent field inherits, and
//! nested sections are merged field by field.
//!
//! ## Example
//! ```rust,ignore
//! let config = FormConfig::load("formhelper.toml").await?;
//! let picker = config.picker.merged(&PickerOverrides {
//!     max_files: Some(3),
//!     ..PickerOverrides::default()
//! });
//! ```

use std::path::Path;

use bytesize::ByteSize;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::{FormError, FormResult};
use crate::fs::mime_type;
use crate::logging::LoggerConfig;

/// Default per-picker and form-wide byte limit.
pub const DEFAULT_MAX_BYTES: ByteSize = ByteSize::mib(10);

/// Default per-picker and form-wide file count limit.
pub const DEFAULT_MAX_FILES: u32 = 10;

/// Writes a byte limit as its exact integer count. The human-readable form
/// rounds (`1.4 MiB`) and would not load back to the same limit.
fn serialize_exact_bytes<S: serde::Serializer>(
    size: &ByteSize,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(size.as_u64())
}

// ------------------------------------------------------------
// Merge
// ------------------------------------------------------------

/// Recursive "override wins, absent inherits" merge.
pub trait Merge: Clone {
    type Overrides;

    fn merge(&mut self, overrides: &Self::Overrides);

    #[must_use]
    fn merged(&self, overrides: &Self::Overrides) -> Self {
        let mut merged: Self = self.clone();
        merged.merge(overrides);
        merged
    }
}

// ------------------------------------------------------------
// AcceptedTypes
// ------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AcceptedTypesRepr {
    Delimited(String),
    List(Vec<String>),
}

/// Normalized `accept` patterns: `.ext`, `type/*` or an exact media type.
///
/// Built from either a delimited string (`".pdf, image/*"`) or a list. An empty
/// set accepts every file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AcceptedTypesRepr", into = "Vec<String>")]
pub struct AcceptedTypes(IndexSet<String>);

impl AcceptedTypes {
    #[must_use]
    pub fn parse(delimited: &str) -> Self {
        Self::from_list(delimited.split([',', ' ', ';']))
    }

    pub fn from_list<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            patterns
                .into_iter()
                .map(|pattern| pattern.as_ref().trim().to_lowercase())
                .filter(|pattern| !pattern.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Value for an HTML `accept` attribute.
    #[must_use]
    pub fn to_accept_attr(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// Whether a filename (and its resolved media type) satisfies any pattern.
    #[must_use]
    pub fn accepts(&self, filename: &str) -> bool {
        if self.0.is_empty() {
            return true;
        }

        let extension: Option<String> = mime_type::extension_of(filename);
        let media_type: &str = mime_type::media_type_of(filename);

        self.0.iter().any(|pattern| {
            if let Some(ext) = pattern.strip_prefix('.') {
                extension.as_deref() == Some(ext)
            } else if let Some(family) = pattern.strip_suffix("/*") {
                media_type
                    .split_once('/')
                    .is_some_and(|(kind, _)| kind == family)
            } else {
                media_type == pattern
            }
        })
    }
}

impl From<AcceptedTypesRepr> for AcceptedTypes {
    fn from(repr: AcceptedTypesRepr) -> Self {
        match repr {
            AcceptedTypesRepr::Delimited(s) => Self::parse(&s),
            AcceptedTypesRepr::List(list) => Self::from_list(list),
        }
    }
}

impl From<AcceptedTypes> for Vec<String> {
    fn from(types: AcceptedTypes) -> Self {
        types.0.into_iter().collect()
    }
}

impl From<&str> for AcceptedTypes {
    fn from(delimited: &str) -> Self {
        Self::parse(delimited)
    }
}

// ------------------------------------------------------------
// Picker configuration
// ------------------------------------------------------------

/// The hidden `<input type="file">` each picker submits through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInputConfig {
    /// Multipart field name for selected files
    pub name: String,

    /// Accepted extensions / media types
    pub accept: AcceptedTypes,

    /// Allow selecting several files in one dialog
    pub multiple: bool,
}

impl Default for FileInputConfig {
    fn default() -> Self {
        Self {
            name: "files[]".to_string(),
            accept: AcceptedTypes::default(),
            multiple: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileInputOverrides {
    pub name: Option<String>,
    pub accept: Option<AcceptedTypes>,
    pub multiple: Option<bool>,
}

impl Merge for FileInputConfig {
    type Overrides = FileInputOverrides;

    fn merge(&mut self, overrides: &FileInputOverrides) {
        if let Some(name) = &overrides.name {
            self.name.clone_from(name);
        }
        if let Some(accept) = &overrides.accept {
            self.accept = accept.clone();
        }
        if let Some(multiple) = overrides.multiple {
            self.multiple = multiple;
        }
    }
}

/// Limits and allowed actions of one picker. Immutable once the picker exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Byte limit for this picker's files
    #[serde(serialize_with = "serialize_exact_bytes")]
    pub max_bytes: ByteSize,

    /// File count limit for this picker
    pub max_files: u32,

    /// Show the modify (re-select) action on each file
    pub can_modify: bool,

    /// Show the remove action on each file
    pub can_remove: bool,

    /// Accept files dropped onto the picker
    pub can_drag_drop: bool,

    /// Host element the picker mounts into; `None` uses the form root
    pub container: Option<String>,

    pub file_input: FileInputConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            can_modify: true,
            can_remove: true,
            can_drag_drop: true,
            container: None,
            file_input: FileInputConfig::default(),
        }
    }
}

impl PickerConfig {
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes.as_u64()
    }

    #[must_use]
    pub const fn accepted_types(&self) -> &AcceptedTypes {
        &self.file_input.accept
    }

    #[must_use]
    pub const fn allow_multiple(&self) -> bool {
        self.file_input.multiple
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PickerOverrides {
    pub max_bytes: Option<ByteSize>,
    pub max_files: Option<u32>,
    pub can_modify: Option<bool>,
    pub can_remove: Option<bool>,
    pub can_drag_drop: Option<bool>,
    pub container: Option<String>,
    pub file_input: FileInputOverrides,
}

impl Merge for PickerConfig {
    type Overrides = PickerOverrides;

    fn merge(&mut self, overrides: &PickerOverrides) {
        if let Some(max_bytes) = overrides.max_bytes {
            self.max_bytes = max_bytes;
        }
        if let Some(max_files) = overrides.max_files {
            self.max_files = max_files;
        }
        if let Some(can_modify) = overrides.can_modify {
            self.can_modify = can_modify;
        }
        if let Some(can_remove) = overrides.can_remove {
            self.can_remove = can_remove;
        }
        if let Some(can_drag_drop) = overrides.can_drag_drop {
            self.can_drag_drop = can_drag_drop;
        }
        if let Some(container) = &overrides.container {
            self.container = Some(container.clone());
        }
        self.file_input.merge(&overrides.file_input);
    }
}

// ------------------------------------------------------------
// Form-level configuration
// ------------------------------------------------------------

/// Aggregate limits across every picker of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormLimits {
    #[serde(serialize_with = "serialize_exact_bytes")]
    pub max_bytes: ByteSize,
    pub max_files: u32,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// Whether a check stops at the first violation or reports all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    #[default]
    FailFast,

    CollectAll,
}

/// User-visible strings. The two overload templates take `{0}` (limit) and
/// `{1}` (actual value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub select_file: String,
    pub selecting_file: String,
    pub unselect_file: String,
    pub limit_msg: String,
    pub invalid_msg: String,
    pub file_size_overload: String,
    pub file_count_overload: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            select_file: "Select file".to_string(),
            selecting_file: "Selecting files...".to_string(),
            unselect_file: "No files selected.".to_string(),
            limit_msg: "File size limit (MB)".to_string(),
            invalid_msg: "File format not supported.".to_string(),
            file_size_overload: "File size overload! The limit is {0}.".to_string(),
            file_count_overload: "File count overload! The limit is {0} files.".to_string(),
        }
    }
}

/// Main configuration struct for a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Defaults every picker is created from
    pub picker: PickerConfig,

    /// Form-wide aggregate limits
    pub limits: FormLimits,

    pub language: LanguageConfig,

    pub validation: ValidationPolicy,

    pub logging: LoggerConfig,
}

impl FormConfig {
    pub fn from_toml_str(text: &str) -> FormResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> FormResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads config from a TOML file.
    pub async fn load<P: AsRef<Path>>(path: P) -> FormResult<Self> {
        let path: &Path = path.as_ref();

        info!("Loading form config from {}", path.display());

        let text: String = TokioFs::read_to_string(path)
            .await
            .map_err(|e| FormError::config_io(path, e))?;

        Self::from_toml_str(&text)
    }

    /// Loads config if the file exists, otherwise returns defaults.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> FormResult<Self> {
        let path: &Path = path.as_ref();

        if TokioFs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            info!(
                "No config file found at {}, using default configuration",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Saves config to a TOML file, creating parent directories.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> FormResult<()> {
        let path: &Path = path.as_ref();

        info!("Saving form config to {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| FormError::config_io(parent, e))?;
        }

        let toml_str: String = self.to_toml_string()?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|e| FormError::config_io(path, e))?;

        Ok(())
    }
}
