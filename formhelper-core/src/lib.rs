//! File picker state and validation for web forms.
//!
//! Pickers hold the files a user selected, a registry holds the pickers of
//! one form, and the [`FormController`] checks per-picker and form-wide
//! limits before handing a multipart body to a [`Transport`].

pub mod error;

pub mod config;

pub mod logging;
pub use logging::{LoggerBuilder, LoggerConfig};

pub mod util;

pub mod fs {
    pub mod mime_type;
    pub use mime_type::{FileCategory, classify};

    pub mod file_record;
    pub use file_record::{ExistingFile, FileHandle, FileRecord, FileSource, RecordId};
}

pub mod model {
    pub mod picker;
    pub use picker::{PickerCallbacks, PickerId, PickerInstance, PickerUiState};

    pub mod picker_registry;
    pub use picker_registry::{AggregateInfo, PickerRegistry, PickerSummary};
}

pub mod validation;

pub mod controller;

pub mod view {
    pub mod icons;
    pub use icons::icon_for;

    pub mod template;
    pub use template::{FileBoxView, PickerView, TemplateHook, Templates};
}

pub use config::{FormConfig, FormLimits, PickerConfig, PickerOverrides, ValidationPolicy};
pub use controller::{
    ExtraFields, FailureHandler, FieldValue, FormController, MultipartBody, SubmitOutcome,
    Transport,
};
pub use error::{FormError, FormResult};
pub use fs::{FileCategory, FileHandle, FileRecord};
pub use model::{PickerId, PickerInstance, PickerRegistry};
pub use util::format_bytes;
pub use validation::{ValidationEngine, ValidationViolation, ViolationKind, ViolationScope};
