//! Breakpoint checkers.
//!
//! Before dispatching a syntax node the machine asks its checker whether to
//! stop. The node stays on the agenda, so resuming dispatches it.

use rustc_hash::FxHashSet;
use sable_ir::{Ast, NodeId, NodeKind};

/// Receives the "current node" stream and decides where to pause.
pub trait BreakpointChecker {
    /// Called for every syntax node about to be dispatched.
    fn should_pause(&mut self, ast: &Ast, node: NodeId) -> bool;
}

/// Never pauses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBreakpoints;

impl BreakpointChecker for NoBreakpoints {
    #[inline]
    fn should_pause(&mut self, _ast: &Ast, _node: NodeId) -> bool {
        false
    }
}

/// Pauses at statements starting at one of the given source offsets, the
/// way an editor gutter marks a line.
#[derive(Clone, Debug, Default)]
pub struct SpanBreakpoints {
    offsets: FxHashSet<u32>,
}

impl SpanBreakpoints {
    pub fn new(offsets: impl IntoIterator<Item = u32>) -> Self {
        SpanBreakpoints {
            offsets: offsets.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, offset: u32) -> bool {
        self.offsets.insert(offset)
    }

    pub fn remove(&mut self, offset: u32) -> bool {
        self.offsets.remove(&offset)
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl BreakpointChecker for SpanBreakpoints {
    fn should_pause(&mut self, ast: &Ast, node: NodeId) -> bool {
        if self.offsets.is_empty() {
            return false;
        }
        let kind = ast.kind(node);
        kind.is_statement()
            && !matches!(kind, NodeKind::Program { .. })
            && self.offsets.contains(&ast.span(node).start)
    }
}

impl<F> BreakpointChecker for F
where
    F: FnMut(&Ast, NodeId) -> bool,
{
    fn should_pause(&mut self, ast: &Ast, node: NodeId) -> bool {
        self(ast, node)
    }
}
