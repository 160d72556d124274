//! Diagnostic system for runtime error reporting.
//!
//! A diagnostic carries:
//! - an error code for `sable explain` lookups
//! - a message (what went wrong)
//! - a primary span (where it went wrong)
//! - secondary labels and notes (context)
//! - the call chain live when evaluation stopped
//! - suggestions (how to fix)
//!
//! This crate knows nothing about the evaluator; the driver converts
//! evaluator errors into [`Diagnostic`]s.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;
pub mod span_utils;

pub use diagnostic::{CallSite, Diagnostic, Label};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;
