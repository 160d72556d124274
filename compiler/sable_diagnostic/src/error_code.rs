//! Error codes for evaluator diagnostics.
//!
//! Each code is a unique identifier (e.g. `E7001`) used for `sable explain`
//! lookups and documentation.

use std::fmt;

/// Error codes for all runtime diagnostics.
///
/// Format: E#### where the first digit indicates the category:
/// - E7xxx: Runtime / evaluation errors
/// - E9xxx: Internal evaluator errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Scoping (E70xx)
    /// Name declared twice in one block
    E7001,
    /// Read or write before initialization (temporal dead zone)
    E7002,
    /// Name not declared in any enclosing scope
    E7003,
    /// Assignment to a constant
    E7004,

    // Runtime type checks (E71xx)
    /// Unary operator applied to the wrong type
    E7101,
    /// Binary operator applied to the wrong types
    E7102,
    /// Logical operator with a non-boolean left operand
    E7103,
    /// Non-boolean condition
    E7104,
    /// Member access on the wrong type
    E7105,

    // Calls and control (E72xx)
    /// Wrong number of arguments
    E7201,
    /// Calling a value that is not a function
    E7202,
    /// `break`/`continue` outside a loop
    E7203,
    /// Host function failure
    E7204,

    // Resources (E73xx)
    /// Maximum call depth exceeded
    E7301,
    /// Execution step or time limit exceeded
    E7302,

    // Internal Errors (E9xxx)
    /// Internal evaluator error
    E9001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E7001,
        ErrorCode::E7002,
        ErrorCode::E7003,
        ErrorCode::E7004,
        ErrorCode::E7101,
        ErrorCode::E7102,
        ErrorCode::E7103,
        ErrorCode::E7104,
        ErrorCode::E7105,
        ErrorCode::E7201,
        ErrorCode::E7202,
        ErrorCode::E7203,
        ErrorCode::E7204,
        ErrorCode::E7301,
        ErrorCode::E7302,
        ErrorCode::E9001,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E7001 => "E7001",
            ErrorCode::E7002 => "E7002",
            ErrorCode::E7003 => "E7003",
            ErrorCode::E7004 => "E7004",
            ErrorCode::E7101 => "E7101",
            ErrorCode::E7102 => "E7102",
            ErrorCode::E7103 => "E7103",
            ErrorCode::E7104 => "E7104",
            ErrorCode::E7105 => "E7105",
            ErrorCode::E7201 => "E7201",
            ErrorCode::E7202 => "E7202",
            ErrorCode::E7203 => "E7203",
            ErrorCode::E7204 => "E7204",
            ErrorCode::E7301 => "E7301",
            ErrorCode::E7302 => "E7302",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is a scoping error (E70xx range).
    pub fn is_scope_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E7001 | ErrorCode::E7002 | ErrorCode::E7003 | ErrorCode::E7004
        )
    }

    /// Check if this is a runtime type-check error (E71xx range).
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E7101
                | ErrorCode::E7102
                | ErrorCode::E7103
                | ErrorCode::E7104
                | ErrorCode::E7105
        )
    }

    /// Check if this is a call/control error (E72xx range).
    pub fn is_control_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E7201 | ErrorCode::E7202 | ErrorCode::E7203 | ErrorCode::E7204
        )
    }

    /// Check if this is a resource-exhaustion error (E73xx range).
    pub fn is_resource_error(&self) -> bool {
        matches!(self, ErrorCode::E7301 | ErrorCode::E7302)
    }

    /// Check if this is an internal error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E7001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
