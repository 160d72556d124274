//! First-class continuations.
//!
//! `call_cc(f)` snapshots the registers and passes the snapshot to `f` as a
//! callable value. Invoking it substitutes copies of the snapshot for the
//! machine's registers, so a continuation can be invoked any number of
//! times, including after the `call_cc` that created it has returned.

use std::fmt;

use crate::diagnostics::CallStack;
use crate::environment::Env;
use crate::stack::{Agenda, Stash};

/// An immutable register snapshot.
pub struct Continuation {
    agenda: Agenda,
    stash: Stash,
    env: Env,
    calls: CallStack,
}

impl Continuation {
    pub(crate) fn capture(agenda: &Agenda, stash: &Stash, env: &Env, calls: &CallStack) -> Self {
        Continuation {
            agenda: agenda.clone(),
            stash: stash.clone(),
            env: env.clone(),
            calls: calls.clone(),
        }
    }

    /// Fresh copies of the captured registers.
    pub(crate) fn restore(&self) -> (Agenda, Stash, Env, CallStack) {
        (
            self.agenda.clone(),
            self.stash.clone(),
            self.env.clone(),
            self.calls.clone(),
        )
    }

    /// Call depth at the capture point.
    pub fn depth(&self) -> usize {
        self.calls.depth()
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("agenda", &self.agenda.len())
            .field("stash", &self.stash.len())
            .field("env", &self.env)
            .finish()
    }
}
