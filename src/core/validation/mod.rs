//! Validation and filtering system
//!
//! Payloads declare a [`ValidationSchema`]; the [`Validated`] extractor
//! rejects malformed input before handlers run.

pub mod config;
pub mod extractor;
pub mod filters;
pub mod validators;

pub use config::{FieldRule, ValidationSchema};
pub use extractor::{Validated, ValidatedPayload, validate_payload};
