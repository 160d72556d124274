//! Sable Eval - explicit-control evaluator.
//!
//! The machine evaluates a `sable_ir::Ast` without recursing on the host
//! stack. Its whole state is three registers:
//! - `Agenda`: pending work, each item a syntax node or an `Instr`
//! - `Stash`: intermediate values
//! - the current `Env`
//!
//! plus a `CallStack` used for depth limiting and overflow diagnostics.
//! Because nothing lives on the host stack, tail calls run in constant
//! space, execution can pause at a breakpoint and resume later, and
//! `call_cc` can reify the registers as a first-class continuation.
//!
//! # Architecture
//!
//! - `environment`: scope frames with temporal-dead-zone slots
//! - `checks`: runtime type checks and operator semantics
//! - `instr`: the instruction set
//! - `stack`: agenda and stash
//! - `machine`: dispatch loop, node decomposition, application and control
//! - `prelude`: host functions installed in the global frame

mod checks;
mod continuation;
mod diagnostics;
mod environment;
pub mod errors;
mod host;
mod instr;
mod machine;
pub mod prelude;
mod print_handler;
mod stack;
mod value;

pub use checks::{LanguageLevel, RuntimeChecks};
pub use continuation::Continuation;
pub use diagnostics::{CallFrame, CallStack, EvalBacktrace};
pub use environment::{Env, EnvId, LocalScope, Mutability, ScopeError};
pub use errors::{EvalError, EvalErrorKind, EvalNote, EvalResult, HostError, Side};
pub use host::{Arity, HostContext, HostFn, HostFunction};
pub use instr::{Instr, Item, MarkerKind};
pub use machine::{
    BreakpointChecker, Machine, MachineBuilder, MachineConfig, NoBreakpoints, Outcome, Run,
    SpanBreakpoints, Suspended,
};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use stack::{Agenda, Stash};
pub use value::{format_number, Closure, Object, Value};
