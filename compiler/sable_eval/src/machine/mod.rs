//! The dispatch loop.
//!
//! One step pops one agenda item. A syntax node decomposes into more items
//! (`nodes.rs`); an instruction acts on the stash and environment
//! (`instrs.rs`, `apply.rs`). The loop ends when the agenda is empty, and the
//! stash top is the program's value.
//!
//! All state lives in the `Machine` value, so `run()` can return at a pause
//! and be called again to continue from exactly the same registers.

mod apply;
mod breakpoints;
mod builder;
mod config;
mod instrs;
mod nodes;

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use sable_ir::{Ast, NodeId, Span};

use crate::checks::RuntimeChecks;
use crate::diagnostics::CallStack;
use crate::environment::{Env, EnvId};
use crate::errors::{timeout, EvalError, EvalResult};
use crate::host::HostFunction;
use crate::instr::Item;
use crate::print_handler::SharedPrintHandler;
use crate::stack::{Agenda, Stash};
use crate::value::Value;

pub use breakpoints::{BreakpointChecker, NoBreakpoints, SpanBreakpoints};
pub use builder::MachineBuilder;
pub use config::MachineConfig;

/// Why `run()` returned.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The agenda is empty.
    Finished(Value),
    /// Stopped before (breakpoint) or after (`debugger`) this node.
    Paused { node: NodeId },
}

/// Explicit-control machine over one syntax tree.
pub struct Machine<'a> {
    ast: &'a Ast,
    config: MachineConfig,
    checks: RuntimeChecks,

    // Registers
    agenda: Agenda,
    stash: Stash,
    env: Env,

    global: Env,
    calls: CallStack,
    next_env_id: u32,

    // Clock
    steps: u64,
    /// Run time accumulated by finished `run()` calls.
    elapsed: Duration,
    run_started: Instant,

    current_node: Option<NodeId>,
    /// Set when a breakpoint fired on the agenda top; cleared once it runs.
    skip_breakpoint: bool,
    /// Set by `debugger`; reported after the current step.
    pause_requested: Option<NodeId>,
    breakpoints: Box<dyn BreakpointChecker>,

    print: SharedPrintHandler,
    array_methods: FxHashMap<&'static str, Rc<HostFunction>>,
}

impl<'a> Machine<'a> {
    /// A machine with default limits, the prelude and stdout output.
    pub fn new(ast: &'a Ast) -> Self {
        MachineBuilder::new().build(ast)
    }

    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    /// Run until finished or paused.
    ///
    /// After a pause, calling `run()` again continues where it stopped.
    /// After an error the machine state is unspecified and should be dropped.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) -> EvalResult<Outcome> {
        self.run_started = Instant::now();
        let result = loop {
            match self.step() {
                Ok(Some(outcome)) => break Ok(outcome),
                Ok(None) => {}
                Err(err) => break Err(err),
            }
        };
        self.elapsed += self.run_started.elapsed();
        if let Ok(Outcome::Paused { node }) = &result {
            tracing::debug!(?node, steps = self.steps, "paused");
        }
        result
    }

    /// Run to the end, ignoring breakpoints and `debugger` statements.
    pub fn run_to_completion(&mut self) -> EvalResult<Value> {
        loop {
            if let Outcome::Finished(value) = self.run()? {
                return Ok(value);
            }
        }
    }

    /// Consume the machine and run it; a pause hands back a `Suspended`.
    pub fn start(mut self) -> EvalResult<Run<'a>> {
        match self.run()? {
            Outcome::Finished(value) => Ok(Run::Finished(value)),
            Outcome::Paused { node } => Ok(Run::Paused(Suspended {
                machine: self,
                node,
            })),
        }
    }

    /// Perform one agenda item.
    ///
    /// Returns `Some` when the machine finished or paused, `None` when there
    /// is more to do.
    pub fn step(&mut self) -> EvalResult<Option<Outcome>> {
        let Some(top) = self.agenda.peek() else {
            return Ok(Some(Outcome::Finished(self.result())));
        };

        if let Item::Node(node) = *top {
            if !self.skip_breakpoint && self.breakpoints.should_pause(self.ast, node) {
                self.skip_breakpoint = true;
                return Ok(Some(Outcome::Paused { node }));
            }
        }
        self.skip_breakpoint = false;

        let Some(item) = self.agenda.pop() else {
            return Ok(Some(Outcome::Finished(self.result())));
        };
        if let Err(err) = self.execute(item) {
            return Err(self.fail(err));
        }

        Ok(self
            .pause_requested
            .take()
            .map(|node| Outcome::Paused { node }))
    }

    fn execute(&mut self, item: Item) -> EvalResult<()> {
        self.tick()?;
        match item {
            Item::Node(node) => {
                self.current_node = Some(node);
                tracing::trace!(?node, kind = self.ast.kind(node).describe(), "node");
                self.eval_node(node)
            }
            Item::Instr(instr) => {
                tracing::trace!(instr = instr.describe(), "instr");
                self.exec_instr(instr)
            }
        }
    }

    /// Count a step and enforce the step and time limits.
    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if let Some(limit) = self.config.step_limit {
            if self.steps > limit {
                return Err(timeout(self.steps));
            }
        }
        if self.steps % self.config.deadline_check_interval.max(1) == 0 {
            self.check_deadline()?;
        }
        Ok(())
    }

    fn check_deadline(&self) -> EvalResult<()> {
        if let Some(limit) = self.config.time_limit {
            if self.elapsed + self.run_started.elapsed() > limit {
                return Err(timeout(self.steps));
            }
        }
        Ok(())
    }

    /// Locate an error that escaped a handler and attach the call chain.
    #[cold]
    fn fail(&self, err: EvalError) -> EvalError {
        let err = match self.current_node {
            Some(node) if err.span.is_none() => self.at(err, node),
            _ => err,
        };
        let err = self.calls.attach_backtrace(err);
        tracing::debug!(error = %err, span = ?err.span, "evaluation failed");
        err
    }

    /// Attribute `err` to `node` unless it is already located.
    fn at(&self, err: EvalError, node: NodeId) -> EvalError {
        let err = if err.span.is_none() {
            err.with_span(self.ast.span(node))
        } else {
            err
        };
        if err.node.is_none() {
            err.with_node(node)
        } else {
            err
        }
    }

    fn fresh_env_id(&mut self) -> EnvId {
        let id = EnvId::new(self.next_env_id);
        self.next_env_id = self.next_env_id.wrapping_add(1);
        id
    }

    fn result(&self) -> Value {
        self.stash.last().cloned().unwrap_or(Value::Undefined)
    }

    // Inspection

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    /// The current environment.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// The frame holding the prelude and embedder functions.
    pub fn global_env(&self) -> &Env {
        &self.global
    }

    /// The syntax node dispatched most recently.
    pub fn current_node(&self) -> Option<NodeId> {
        self.current_node
    }

    /// Dispatch steps performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Live (non-tail) calls.
    pub fn call_depth(&self) -> usize {
        self.calls.depth()
    }

    pub fn is_finished(&self) -> bool {
        self.agenda.is_empty()
    }
}

impl fmt::Debug for Machine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("agenda", &self.agenda.len())
            .field("stash", &self.stash.len())
            .field("env", &self.env)
            .field("calls", &self.calls.depth())
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Result of `Machine::start`.
#[derive(Debug)]
pub enum Run<'a> {
    Finished(Value),
    Paused(Suspended<'a>),
}

/// A paused machine, resumable later.
pub struct Suspended<'a> {
    machine: Machine<'a>,
    node: NodeId,
}

impl<'a> Suspended<'a> {
    /// The node the machine stopped at.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn span(&self) -> Span {
        self.machine.ast.span(self.node)
    }

    pub fn machine(&self) -> &Machine<'a> {
        &self.machine
    }

    /// Continue from the pause point.
    pub fn resume(self) -> EvalResult<Run<'a>> {
        self.machine.start()
    }
}

impl fmt::Debug for Suspended<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspended")
            .field("node", &self.node)
            .field("machine", &self.machine)
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
