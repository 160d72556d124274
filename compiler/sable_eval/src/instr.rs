//! The machine's instruction set.
//!
//! An `Instr` is inert while it sits on the agenda; its effect applies only
//! when the dispatch loop pops it. Each variant carries exactly the data
//! needed to resume: a `Branch` holds both arms, an `Application` its
//! arity, a `While` its test and body.
//!
//! The free functions at the bottom build agenda `Item`s, so node handlers
//! read as the sequence of work they schedule.

use std::rc::Rc;

use sable_ir::{BinaryOp, LogicalOp, Name, NodeId, UnaryOp};

use crate::environment::Env;
use crate::value::Value;

/// What an unwinding search stops at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// Boundary of a function body; target of `return`.
    Call,
    /// Loop exit; target of `break`.
    Break,
    /// End of one loop iteration; target of `continue`.
    Continue,
}

#[derive(Clone, Debug)]
pub enum Instr {
    /// Discard agenda items through the nearest call marker (`return`).
    Reset,
    /// No-op sentinel for unwinding.
    Marker(MarkerKind),
    /// Drop the stash top.
    Pop,
    Push(Value),
    /// Make sure the program leaves a value, even when its body is empty.
    PushUndefinedIfNeeded,
    /// Assign the stash top to `name`, leaving it in place.
    Assign { name: Name, node: NodeId },
    /// Initialize `name` from the stash top; the statement's value is
    /// `undefined`.
    Declare { name: Name, node: NodeId },
    Unary { op: UnaryOp, node: NodeId },
    Binary { op: BinaryOp, node: NodeId },
    /// Left operand is on the stash; `right` runs only if it does not
    /// short-circuit.
    Logical {
        op: LogicalOp,
        right: NodeId,
        node: NodeId,
    },
    /// Test is on the stash. A missing alternate yields `undefined`.
    Branch {
        consequent: NodeId,
        alternate: Option<NodeId>,
        node: NodeId,
    },
    /// Restore the current environment. `call_frame` marks the restore that
    /// closes a function call, which also pops the call stack.
    Environment { env: Env, call_frame: bool },
    /// Test result is on the stash, previous iteration's value beneath it.
    While {
        test: NodeId,
        body: NodeId,
        node: NodeId,
    },
    For {
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
        loop_vars: Rc<[Name]>,
        node: NodeId,
    },
    /// Switch to a fresh copy of the loop variables.
    IterationEnv { loop_vars: Rc<[Name]> },
    /// Callee and `arity` arguments are on the stash (receiver beneath the
    /// callee for method calls).
    Application {
        arity: usize,
        receiver: bool,
        node: NodeId,
    },
    Break { node: NodeId },
    Continue { node: NodeId },
    /// `len` elements are on the stash, first element deepest.
    ArrayLiteral { len: usize, node: NodeId },
    ObjectLiteral { keys: Rc<[Name]>, node: NodeId },
    /// Object and key are on the stash.
    MemberAccess { node: NodeId },
    /// Object, key and value are on the stash.
    MemberAssign { node: NodeId },
    /// Resolve a method on the object at the stash top, keeping the object
    /// as the receiver. `None` means the key was computed onto the stash.
    MethodLookup {
        property: Option<Name>,
        node: NodeId,
    },
}

impl Instr {
    /// Short name for traces.
    pub const fn describe(&self) -> &'static str {
        match self {
            Instr::Reset => "reset",
            Instr::Marker(MarkerKind::Call) => "call marker",
            Instr::Marker(MarkerKind::Break) => "break marker",
            Instr::Marker(MarkerKind::Continue) => "continue marker",
            Instr::Pop => "pop",
            Instr::Push(_) => "push",
            Instr::PushUndefinedIfNeeded => "push undefined if needed",
            Instr::Assign { .. } => "assign",
            Instr::Declare { .. } => "declare",
            Instr::Unary { .. } => "unary",
            Instr::Binary { .. } => "binary",
            Instr::Logical { .. } => "logical",
            Instr::Branch { .. } => "branch",
            Instr::Environment { .. } => "environment",
            Instr::While { .. } => "while",
            Instr::For { .. } => "for",
            Instr::IterationEnv { .. } => "iteration environment",
            Instr::Application { .. } => "application",
            Instr::Break { .. } => "break",
            Instr::Continue { .. } => "continue",
            Instr::ArrayLiteral { .. } => "array literal",
            Instr::ObjectLiteral { .. } => "object literal",
            Instr::MemberAccess { .. } => "member access",
            Instr::MemberAssign { .. } => "member assign",
            Instr::MethodLookup { .. } => "method lookup",
        }
    }
}

/// One unit of pending work.
#[derive(Clone, Debug)]
pub enum Item {
    /// Evaluate this node.
    Node(NodeId),
    /// Perform this step.
    Instr(Instr),
}

impl Item {
    #[inline]
    pub fn is_marker(&self, kind: MarkerKind) -> bool {
        matches!(self, Item::Instr(Instr::Marker(k)) if *k == kind)
    }
}

impl From<NodeId> for Item {
    fn from(node: NodeId) -> Self {
        Item::Node(node)
    }
}

impl From<Instr> for Item {
    fn from(instr: Instr) -> Self {
        Item::Instr(instr)
    }
}

// Constructors

pub fn node(id: NodeId) -> Item {
    Item::Node(id)
}

pub fn reset() -> Item {
    Item::Instr(Instr::Reset)
}

pub fn marker(kind: MarkerKind) -> Item {
    Item::Instr(Instr::Marker(kind))
}

pub fn pop() -> Item {
    Item::Instr(Instr::Pop)
}

pub fn push(value: Value) -> Item {
    Item::Instr(Instr::Push(value))
}

pub fn push_undefined() -> Item {
    push(Value::Undefined)
}

pub fn push_undefined_if_needed() -> Item {
    Item::Instr(Instr::PushUndefinedIfNeeded)
}

pub fn assign(name: Name, node: NodeId) -> Item {
    Item::Instr(Instr::Assign { name, node })
}

pub fn declare(name: Name, node: NodeId) -> Item {
    Item::Instr(Instr::Declare { name, node })
}

pub fn unary(op: UnaryOp, node: NodeId) -> Item {
    Item::Instr(Instr::Unary { op, node })
}

pub fn binary(op: BinaryOp, node: NodeId) -> Item {
    Item::Instr(Instr::Binary { op, node })
}

pub fn logical(op: LogicalOp, right: NodeId, node: NodeId) -> Item {
    Item::Instr(Instr::Logical { op, right, node })
}

pub fn branch(consequent: NodeId, alternate: Option<NodeId>, node: NodeId) -> Item {
    Item::Instr(Instr::Branch {
        consequent,
        alternate,
        node,
    })
}

pub fn environment(env: Env) -> Item {
    Item::Instr(Instr::Environment {
        env,
        call_frame: false,
    })
}

pub fn call_environment(env: Env) -> Item {
    Item::Instr(Instr::Environment {
        env,
        call_frame: true,
    })
}

pub fn while_(test: NodeId, body: NodeId, node: NodeId) -> Item {
    Item::Instr(Instr::While { test, body, node })
}

pub fn for_(
    test: Option<NodeId>,
    update: Option<NodeId>,
    body: NodeId,
    loop_vars: Rc<[Name]>,
    node: NodeId,
) -> Item {
    Item::Instr(Instr::For {
        test,
        update,
        body,
        loop_vars,
        node,
    })
}

pub fn iteration_env(loop_vars: Rc<[Name]>) -> Item {
    Item::Instr(Instr::IterationEnv { loop_vars })
}

pub fn application(arity: usize, receiver: bool, node: NodeId) -> Item {
    Item::Instr(Instr::Application {
        arity,
        receiver,
        node,
    })
}

pub fn break_(node: NodeId) -> Item {
    Item::Instr(Instr::Break { node })
}

pub fn continue_(node: NodeId) -> Item {
    Item::Instr(Instr::Continue { node })
}

pub fn array_literal(len: usize, node: NodeId) -> Item {
    Item::Instr(Instr::ArrayLiteral { len, node })
}

pub fn object_literal(keys: Rc<[Name]>, node: NodeId) -> Item {
    Item::Instr(Instr::ObjectLiteral { keys, node })
}

pub fn member_access(node: NodeId) -> Item {
    Item::Instr(Instr::MemberAccess { node })
}

pub fn member_assign(node: NodeId) -> Item {
    Item::Instr(Instr::MemberAssign { node })
}

pub fn method_lookup(property: Option<Name>, node: NodeId) -> Item {
    Item::Instr(Instr::MethodLookup { property, node })
}
