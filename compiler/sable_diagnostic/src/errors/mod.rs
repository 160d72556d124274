//! Embedded error documentation for `sable explain`.
//!
//! Each error code has a markdown file in this directory, embedded at
//! compile time and accessed via `ErrorDocs::get()`.

use crate::ErrorCode;

/// Registry of embedded error documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Get the documentation for an error code.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    /// Get all documented error codes.
    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }

    /// Check if an error code has documentation.
    pub fn has_docs(code: ErrorCode) -> bool {
        DOCS.iter().any(|(c, _)| *c == code)
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    // Scoping
    (ErrorCode::E7001, include_str!("E7001.md")),
    (ErrorCode::E7002, include_str!("E7002.md")),
    (ErrorCode::E7003, include_str!("E7003.md")),
    (ErrorCode::E7004, include_str!("E7004.md")),
    // Type checks
    (ErrorCode::E7101, include_str!("E7101.md")),
    (ErrorCode::E7102, include_str!("E7102.md")),
    (ErrorCode::E7103, include_str!("E7103.md")),
    (ErrorCode::E7104, include_str!("E7104.md")),
    (ErrorCode::E7105, include_str!("E7105.md")),
    // Calls and control
    (ErrorCode::E7201, include_str!("E7201.md")),
    (ErrorCode::E7202, include_str!("E7202.md")),
    (ErrorCode::E7203, include_str!("E7203.md")),
    (ErrorCode::E7204, include_str!("E7204.md")),
    // Resources
    (ErrorCode::E7301, include_str!("E7301.md")),
    (ErrorCode::E7302, include_str!("E7302.md")),
    // Internal
    (ErrorCode::E9001, include_str!("E9001.md")),
];

#[cfg(test)]
mod tests;
