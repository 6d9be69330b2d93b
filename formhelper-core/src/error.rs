//! src/error.rs
//! ============================================================================
//! # `FormError`: Unified Error Type for the Form Helper
//!
//! Every fallible operation in the crate returns `FormResult<T>`. Limit
//! violations are not errors in the usual sense: the controller hands them to a
//! failure handler and only surfaces them here as [`FormError::Validation`] when
//! the handler is configured to re-raise.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::fs::file_record::RecordId;
use crate::model::picker::PickerId;
use crate::validation::violation::ValidationViolation;

pub type FormResult<T> = Result<T, FormError>;

/// Picker actions that configuration can switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    Remove,
    Modify,
    DragDrop,
}

impl std::fmt::Display for PickerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &str = match self {
            Self::Remove => "remove",
            Self::Modify => "modify",
            Self::DragDrop => "drag-and-drop",
        };

        write!(f, "{s}")
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    /// A limit violation that no failure handler absorbed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationViolation),

    /// No picker with this id is registered.
    #[error("Picker {0} is not registered")]
    PickerNotFound(PickerId),

    /// The record is not (or no longer) held by the picker.
    #[error("File {record} not found in picker {picker}")]
    RecordNotFound { picker: PickerId, record: RecordId },

    /// The picker configuration disables this action.
    #[error("Action '{action}' is disabled for picker {picker}")]
    ActionNotAllowed {
        picker: PickerId,
        action: PickerAction,
    },

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A file selected from disk could not be read at submit time.
    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP client failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Submission rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl FormError {
    /// Whether the user can clear the condition by editing the selection.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::PickerNotFound(_)
                | Self::RecordNotFound { .. }
                | Self::ActionNotAllowed { .. }
        )
    }

    /// Create a transport error from any displayable client error
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn config_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for FormError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}
