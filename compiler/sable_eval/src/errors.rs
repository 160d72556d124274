//! Evaluation errors.
//!
//! `EvalErrorKind` is the structured category: every variant carries the
//! names, operators and values a renderer needs, and its `Display` is the
//! terse one-line form. `EvalError` wraps a kind with the location and
//! context the machine knows when the error is raised.
//!
//! Factory functions are the public API for creating errors; the machine
//! attaches spans and backtraces afterwards.

use std::fmt;

use sable_ir::{BinaryOp, LogicalOp, NodeId, Span, UnaryOp};

use crate::diagnostics::{CallFrame, EvalBacktrace};
use crate::environment::ScopeError;
use crate::host::Arity;
use crate::value::Value;

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Operand position of a binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalErrorKind {
    // Structural and scoping
    #[error("`{name}` has already been declared in this scope")]
    Redeclaration { name: String },
    #[error("cannot access `{name}` before initialization")]
    UninitializedAccess { name: String },
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },
    #[error("assignment to constant `{name}`")]
    ConstAssignment { name: String },

    // Runtime type checks
    #[error("expected {expected} operand for `{}`, found {}", .op.as_symbol(), .found.describe())]
    UnaryTypeMismatch {
        op: UnaryOp,
        expected: &'static str,
        found: Value,
    },
    #[error(
        "expected {expected} on the {side} of `{}`, found {}",
        .op.as_symbol(),
        .found.describe()
    )]
    BinaryTypeMismatch {
        op: BinaryOp,
        side: Side,
        expected: &'static str,
        found: Value,
    },
    #[error("expected boolean on the left of `{}`, found {}", .op.as_symbol(), .found.describe())]
    LogicalTypeMismatch { op: LogicalOp, found: Value },
    #[error("expected boolean as {context} condition, found {}", .found.describe())]
    ConditionalTypeMismatch {
        context: &'static str,
        found: Value,
    },
    #[error("expected {expected} as member {part}, found {}", .found.describe())]
    MemberTypeMismatch {
        part: &'static str,
        expected: &'static str,
        found: Value,
    },

    // Calls and control
    #[error("`{name}` expects {expected}, got {found}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        found: usize,
    },
    #[error("calling non-function value {}", .found.describe())]
    NotCallable { found: Value },
    #[error("`{keyword}` outside of a loop")]
    ControlOutsideLoop { keyword: &'static str },

    // Resources
    #[error("maximum call stack size of {limit} exceeded: {}", join_frames(.frames))]
    StackOverflow { limit: usize, frames: Vec<CallFrame> },
    #[error("execution timed out after {steps} steps")]
    Timeout { steps: u64 },

    // Host
    #[error("`{name}` failed: {message}")]
    HostFailure { name: String, message: String },

    // Internal
    #[error("internal error: value stack underflow")]
    StashUnderflow,
    #[error("internal error: malformed tree: {message}")]
    MalformedTree { message: String },
}

/// Most recent call first, as in a host stack trace.
fn join_frames(frames: &[CallFrame]) -> String {
    frames
        .iter()
        .rev()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" <- ")
}

/// Additional context attached to an error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    /// Structured category, used for error-code assignment.
    pub kind: EvalErrorKind,
    /// Source location of the offending node.
    pub span: Option<Span>,
    /// The offending node, when known.
    pub node: Option<NodeId>,
    /// Call chain at the error site, most recent call first.
    pub backtrace: Option<EvalBacktrace>,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            span: None,
            node: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach the offending node. Keeps an existing span.
    #[must_use]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Whether this is a resource-exhaustion error.
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self.kind,
            EvalErrorKind::StackOverflow { .. } | EvalErrorKind::Timeout { .. }
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::from_kind(kind)
    }
}

/// Error returned by host functions.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A machine diagnostic raised inside the host function; passed through
    /// unchanged.
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// Anything else; re-wrapped as `HostFailure` at the call site.
    #[error("{0}")]
    Failed(String),
}

impl HostError {
    #[cold]
    pub fn failed(message: impl Into<String>) -> Self {
        HostError::Failed(message.into())
    }
}

// Scoping

/// Map an environment failure on `name` to its diagnostic.
#[cold]
pub fn scope_error(error: ScopeError, name: &str) -> EvalError {
    let name = name.to_string();
    EvalError::from_kind(match error {
        ScopeError::Redeclaration => EvalErrorKind::Redeclaration { name },
        ScopeError::Uninitialized => EvalErrorKind::UninitializedAccess { name },
        ScopeError::Undefined => EvalErrorKind::UndefinedVariable { name },
        ScopeError::Const => EvalErrorKind::ConstAssignment { name },
    })
}

// Type checks

#[cold]
pub fn unary_type_mismatch(op: UnaryOp, expected: &'static str, found: Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnaryTypeMismatch {
        op,
        expected,
        found,
    })
}

#[cold]
pub fn binary_type_mismatch(
    op: BinaryOp,
    side: Side,
    expected: &'static str,
    found: Value,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch {
        op,
        side,
        expected,
        found,
    })
}

#[cold]
pub fn logical_type_mismatch(op: LogicalOp, found: Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LogicalTypeMismatch { op, found })
}

#[cold]
pub fn conditional_type_mismatch(context: &'static str, found: Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConditionalTypeMismatch { context, found })
}

#[cold]
pub fn member_type_mismatch(part: &'static str, expected: &'static str, found: Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MemberTypeMismatch {
        part,
        expected,
        found,
    })
}

// Calls and control

#[cold]
pub fn arity_mismatch(name: &str, expected: Arity, found: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        found,
    })
}

#[cold]
pub fn not_callable(found: Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { found })
}

#[cold]
pub fn control_outside_loop(keyword: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ControlOutsideLoop { keyword })
}

#[cold]
pub fn host_failure(name: &str, message: String) -> EvalError {
    EvalError::from_kind(EvalErrorKind::HostFailure {
        name: name.to_string(),
        message,
    })
}

// Resources

#[cold]
pub fn stack_overflow(limit: usize, frames: Vec<CallFrame>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { limit, frames })
}

#[cold]
pub fn timeout(steps: u64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Timeout { steps })
}

// Internal

#[cold]
pub fn stash_underflow() -> EvalError {
    EvalError::from_kind(EvalErrorKind::StashUnderflow)
}

#[cold]
pub fn malformed_tree(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MalformedTree {
        message: message.into(),
    })
}
