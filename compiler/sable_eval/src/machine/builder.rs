//! `MachineBuilder` for creating machines with various configurations.

use std::rc::Rc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use sable_ir::Ast;

use super::{BreakpointChecker, Machine, MachineConfig, NoBreakpoints};
use crate::checks::LanguageLevel;
use crate::diagnostics::CallStack;
use crate::environment::{Env, EnvId, Mutability};
use crate::host::HostFunction;
use crate::instr;
use crate::prelude;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::stack::{Agenda, Stash};
use crate::value::Value;

/// Builder for `Machine`.
///
/// The global frame always receives the prelude; functions passed to
/// `host_functions` are installed after it and replace prelude functions of
/// the same name.
#[derive(Default)]
pub struct MachineBuilder {
    config: MachineConfig,
    host_functions: Vec<HostFunction>,
    breakpoints: Option<Box<dyn BreakpointChecker>>,
    print_handler: Option<SharedPrintHandler>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Number of recent calls an overflow diagnostic reports.
    #[must_use]
    pub fn trace_frames(mut self, frames: usize) -> Self {
        self.config.trace_frames = frames;
        self
    }

    #[must_use]
    pub fn step_limit(mut self, steps: u64) -> Self {
        self.config.step_limit = Some(steps);
        self
    }

    #[must_use]
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    /// Select the runtime checks through the language level.
    #[must_use]
    pub fn language(mut self, language: LanguageLevel) -> Self {
        self.config.language = language;
        self
    }

    /// Add embedder functions to the global frame.
    #[must_use]
    pub fn host_functions(mut self, functions: impl IntoIterator<Item = HostFunction>) -> Self {
        self.host_functions.extend(functions);
        self
    }

    #[must_use]
    pub fn breakpoints(mut self, checker: impl BreakpointChecker + 'static) -> Self {
        self.breakpoints = Some(Box::new(checker));
        self
    }

    /// Set where `display` writes. Default is stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Build a machine positioned at the start of `ast`.
    pub fn build(self, ast: &Ast) -> Machine<'_> {
        let global = Env::root(EnvId::new(0), "global");

        let mut globals: FxHashMap<&'static str, Value> = prelude::constants().into_iter().collect();
        for function in prelude::FUNCTIONS.iter().chain(&self.host_functions) {
            globals.insert(function.name, Value::Host(Rc::new(*function)));
        }
        let interner = ast.interner();
        for (name, value) in globals {
            let installed = global.define(interner.intern(name), value, Mutability::Immutable);
            debug_assert!(installed.is_ok(), "global names are unique");
        }

        let array_methods = prelude::ARRAY_METHODS
            .iter()
            .map(|method| (method.name, Rc::new(*method)))
            .collect();

        let mut agenda = Agenda::new();
        agenda.push(instr::node(ast.root()));

        Machine {
            ast,
            checks: self.config.language.checks(),
            agenda,
            stash: Stash::new(),
            env: global.clone(),
            global,
            calls: CallStack::new(self.config.max_call_depth, self.config.trace_frames),
            next_env_id: 1,
            steps: 0,
            elapsed: Duration::ZERO,
            run_started: Instant::now(),
            current_node: None,
            skip_breakpoint: false,
            pause_requested: None,
            breakpoints: self.breakpoints.unwrap_or_else(|| Box::new(NoBreakpoints)),
            print: self.print_handler.unwrap_or_else(stdout_handler),
            array_methods,
            config: self.config,
        }
    }
}
