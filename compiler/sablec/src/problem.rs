//! Evaluator errors as coded diagnostics.
//!
//! Lives in the driver so neither `sable_eval` nor `sable_diagnostic` has to
//! know about the other.

use sable_diagnostic::{Diagnostic, ErrorCode};
use sable_eval::{EvalError, EvalErrorKind};

/// Error code for an evaluator error kind.
pub fn error_code(kind: &EvalErrorKind) -> ErrorCode {
    match kind {
        EvalErrorKind::Redeclaration { .. } => ErrorCode::E7001,
        EvalErrorKind::UninitializedAccess { .. } => ErrorCode::E7002,
        EvalErrorKind::UndefinedVariable { .. } => ErrorCode::E7003,
        EvalErrorKind::ConstAssignment { .. } => ErrorCode::E7004,
        EvalErrorKind::UnaryTypeMismatch { .. } => ErrorCode::E7101,
        EvalErrorKind::BinaryTypeMismatch { .. } => ErrorCode::E7102,
        EvalErrorKind::LogicalTypeMismatch { .. } => ErrorCode::E7103,
        EvalErrorKind::ConditionalTypeMismatch { .. } => ErrorCode::E7104,
        EvalErrorKind::MemberTypeMismatch { .. } => ErrorCode::E7105,
        EvalErrorKind::ArityMismatch { .. } => ErrorCode::E7201,
        EvalErrorKind::NotCallable { .. } => ErrorCode::E7202,
        EvalErrorKind::ControlOutsideLoop { .. } => ErrorCode::E7203,
        EvalErrorKind::HostFailure { .. } => ErrorCode::E7204,
        EvalErrorKind::StackOverflow { .. } => ErrorCode::E7301,
        EvalErrorKind::Timeout { .. } => ErrorCode::E7302,
        EvalErrorKind::StashUnderflow | EvalErrorKind::MalformedTree { .. } => ErrorCode::E9001,
    }
}

fn label(kind: &EvalErrorKind) -> String {
    match kind {
        EvalErrorKind::Redeclaration { name } => format!("`{name}` declared again here"),
        EvalErrorKind::UninitializedAccess { name } => {
            format!("`{name}` is in its temporal dead zone here")
        }
        EvalErrorKind::UndefinedVariable { name } => format!("`{name}` is not in scope"),
        EvalErrorKind::ConstAssignment { name } => format!("cannot assign to `{name}`"),
        EvalErrorKind::UnaryTypeMismatch { found, .. }
        | EvalErrorKind::BinaryTypeMismatch { found, .. }
        | EvalErrorKind::LogicalTypeMismatch { found, .. }
        | EvalErrorKind::ConditionalTypeMismatch { found, .. }
        | EvalErrorKind::MemberTypeMismatch { found, .. } => {
            format!("this is {}", found.describe())
        }
        EvalErrorKind::ArityMismatch { found, .. } => {
            let plural = if *found == 1 { "" } else { "s" };
            format!("called with {found} argument{plural}")
        }
        EvalErrorKind::NotCallable { .. } => "not a function".to_string(),
        EvalErrorKind::ControlOutsideLoop { keyword } => format!("`{keyword}` used here"),
        EvalErrorKind::HostFailure { name, .. } => format!("`{name}` called here"),
        EvalErrorKind::StackOverflow { .. } => "this call exceeded the limit".to_string(),
        EvalErrorKind::Timeout { .. } => "evaluation stopped here".to_string(),
        EvalErrorKind::StashUnderflow | EvalErrorKind::MalformedTree { .. } => {
            "while evaluating this".to_string()
        }
    }
}

fn suggestion(kind: &EvalErrorKind) -> Option<String> {
    match kind {
        EvalErrorKind::UninitializedAccess { name } => Some(format!(
            "move the declaration of `{name}` before its first use"
        )),
        EvalErrorKind::ConstAssignment { name } => Some(format!(
            "declare `{name}` with `let` to allow reassignment"
        )),
        EvalErrorKind::BinaryTypeMismatch { .. } | EvalErrorKind::UnaryTypeMismatch { .. } => {
            Some("run with `--native` to use host coercions instead of checks".to_string())
        }
        EvalErrorKind::StackOverflow { .. } => Some(
            "calls in tail position do not grow the stack; raise the limit with `--max-depth`"
                .to_string(),
        ),
        EvalErrorKind::Timeout { .. } => {
            Some("raise the limit with `--steps` or `--timeout-ms`".to_string())
        }
        _ => None,
    }
}

/// Convert an evaluator error to a diagnostic.
///
/// An overflow lists the frames it captured, oldest first; any other error
/// raised inside a function lists its call chain, most recent call first.
pub fn eval_error_to_diagnostic(err: &EvalError) -> Diagnostic {
    let mut diag = Diagnostic::new(error_code(&err.kind)).with_message(err.kind.to_string());
    if let Some(span) = err.span {
        diag = diag.with_label(span, label(&err.kind));
    }

    let frames = match (&err.kind, &err.backtrace) {
        (EvalErrorKind::StackOverflow { frames, .. }, _) => frames.as_slice(),
        (_, Some(backtrace)) => backtrace.frames(),
        (_, None) => &[],
    };
    for frame in frames {
        diag = diag.with_call(frame.to_string(), frame.span);
    }

    for note in &err.notes {
        if let Some(span) = note.span {
            diag = diag.with_secondary_label(span, note.message.clone());
        }
        diag = diag.with_note(note.message.clone());
    }
    if let Some(suggestion) = suggestion(&err.kind) {
        diag = diag.with_suggestion(suggestion);
    }
    diag
}
