//! Call-stack tracking for depth limiting and overflow diagnostics.
//!
//! - `CallFrame`: one reconstructed call expression (callee + arguments)
//! - `CallStack`: live frames, with the depth check built into `push()`
//! - `EvalBacktrace`: snapshot of the frames at an error site
//!
//! The machine never recurses on the host stack, so this is the only record
//! of "who called whom". A tail call replaces its caller's frame instead of
//! pushing, which keeps the depth constant.

use std::fmt;

use sable_ir::Span;

use crate::errors::{stack_overflow, EvalError};
use crate::value::Value;

/// A single call in the live call stack.
#[derive(Clone, Debug, PartialEq)]
pub struct CallFrame {
    /// Callee as written at the call site, e.g. `f` or `xs.push`.
    pub callee: String,
    pub args: Vec<Value>,
    /// Span of the call expression.
    pub span: Span,
}

impl fmt::Display for CallFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.callee)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&arg.stringify())?;
        }
        f.write_str(")")
    }
}

/// Live call stack.
///
/// Each closure application pushes a frame; restoring the caller's
/// environment pops it.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: usize,
    /// Frames kept in an overflow diagnostic.
    trace_frames: usize,
}

impl CallStack {
    pub fn new(max_depth: usize, trace_frames: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
            trace_frames,
        }
    }

    /// Push a call frame, checking the depth limit.
    ///
    /// On overflow the frame is NOT pushed; the error carries the last
    /// `trace_frames` frames including the one that did not fit.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            let keep = self.trace_frames.saturating_sub(1);
            let start = self.frames.len().saturating_sub(keep);
            let span = frame.span;
            let mut recent = self.frames[start..].to_vec();
            recent.push(frame);
            return Err(stack_overflow(self.max_depth, recent).with_span(span));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Replace the most recent frame (a tail call).
    pub fn replace_top(&mut self, frame: CallFrame) {
        match self.frames.last_mut() {
            Some(top) => *top = frame,
            None => self.frames.push(frame),
        }
    }

    /// Pop the most recent call frame. No-op on an empty stack.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot the most recent `trace_frames` frames, most recent first.
    pub fn capture(&self) -> EvalBacktrace {
        EvalBacktrace::new(
            self.frames
                .iter()
                .rev()
                .take(self.trace_frames)
                .cloned()
                .collect(),
        )
    }

    /// Attach a backtrace to `err` unless it is at top level or already has one.
    pub fn attach_backtrace(&self, err: EvalError) -> EvalError {
        if self.frames.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture())
    }
}

/// Immutable snapshot of the call stack at an error site.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvalBacktrace {
    frames: Vec<CallFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<CallFrame>) -> Self {
        Self { frames }
    }

    /// Most recent call first.
    pub fn frames(&self) -> &[CallFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {frame} at {}", frame.span)?;
        }
        Ok(())
    }
}
