//! Form orchestration and the submission boundary.

pub mod form_controller;
pub mod multipart;
pub mod transport;

pub use form_controller::{FailureHandler, FormController, SubmitOutcome};
pub use multipart::{ExtraFields, FieldValue, MultipartBody, Part};
pub use transport::{ReqwestTransport, Transport};
