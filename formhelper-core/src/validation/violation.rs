//! Limit violations reported by the validation engine
//!
//! • Two kinds (size, count) at two scopes (aggregate, per picker)
//! • Carries the rendered user message and its template code
//! • First-class `tracing` integration through [`ValidationViolation::trace`]

use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::model::picker::PickerId;

/// Code of the size message template.
pub const FILE_SIZE_OVERLOAD: &str = "fileSizeOverload";

/// Code of the count message template.
pub const FILE_COUNT_OVERLOAD: &str = "fileCountOverload";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    SizeExceeded,
    CountExceeded,
}

impl ViolationKind {
    /// Message template key; also the code shown to the user.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SizeExceeded => FILE_SIZE_OVERLOAD,
            Self::CountExceeded => FILE_COUNT_OVERLOAD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationScope {
    /// Across every registered picker
    Aggregate,

    /// Within one picker
    PerPicker,
}

/// One breached limit.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("[{code}]{message}")]
pub struct ValidationViolation {
    pub kind: ViolationKind,
    pub scope: ViolationScope,

    /// Raw limit: bytes for size, files for count
    pub limit: u64,

    /// Raw observed value in the same unit as `limit`
    pub actual: u64,

    /// `limit` as shown to the user (`"1000.00 Bytes"`, `"15"`)
    pub limit_display: String,

    /// Offending picker, `None` at aggregate scope
    pub picker: Option<PickerId>,

    code: &'static str,

    /// Rendered message from the language table
    pub message: String,
}

impl ValidationViolation {
    #[must_use]
    pub fn new(
        kind: ViolationKind,
        scope: ViolationScope,
        limit: u64,
        actual: u64,
        limit_display: String,
        picker: Option<PickerId>,
        message: String,
    ) -> Self {
        Self {
            kind,
            scope,
            limit,
            actual,
            limit_display,
            picker,
            code: kind.code(),
            message,
        }
    }

    #[inline]
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(self.scope, ViolationScope::Aggregate)
    }

    const fn violation_marker(&self) -> &'static str {
        match (self.kind, self.scope) {
            (ViolationKind::SizeExceeded, ViolationScope::Aggregate) => "VIOLATION_FORM_SIZE",
            (ViolationKind::CountExceeded, ViolationScope::Aggregate) => "VIOLATION_FORM_COUNT",
            (ViolationKind::SizeExceeded, ViolationScope::PerPicker) => "VIOLATION_PICKER_SIZE",
            (ViolationKind::CountExceeded, ViolationScope::PerPicker) => "VIOLATION_PICKER_COUNT",
        }
    }

    /// Emit one structured event and hand the violation back unchanged.
    #[must_use]
    pub fn trace(self) -> Self {
        self.trace_ref();
        self
    }

    /// Emit the structured event without taking ownership.
    pub fn trace_ref(&self) {
        event!(
            Level::WARN,
            marker = self.violation_marker(),
            op_type = "form_validation",
            code = self.code,
            scope = ?self.scope,
            picker = ?self.picker,
            limit = self.limit,
            actual = self.actual,
            violation = %self,
        );
    }
}
