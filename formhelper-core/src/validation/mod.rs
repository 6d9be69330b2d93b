//! Limit checking across a form's pickers.

pub mod engine;
pub mod messages;
pub mod violation;

pub use engine::ValidationEngine;
pub use violation::{ValidationViolation, ViolationKind, ViolationScope};
