//! Host functions: opaque native callables with arity metadata.

use std::fmt;

use crate::errors::HostError;
use crate::print_handler::SharedPrintHandler;
use crate::value::Value;

/// Number of arguments a callable accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl Arity {
    #[inline]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::AtMost(n) => count <= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, n) = match self {
            Arity::Exact(n) => ("", *n),
            Arity::AtLeast(n) => ("at least ", *n),
            Arity::AtMost(n) => ("at most ", *n),
        };
        let plural = if n == 1 { "" } else { "s" };
        write!(f, "{prefix}{n} argument{plural}")
    }
}

/// What a host function may touch while it runs.
pub struct HostContext<'a> {
    pub print: &'a SharedPrintHandler,
    /// The object a method was looked up on (`xs` in `xs.push(1)`).
    pub receiver: Option<Value>,
}

/// Signature of a host function.
pub type HostFn = fn(&mut HostContext<'_>, &[Value]) -> Result<Value, HostError>;

/// A native function callable from evaluated code.
///
/// Runs to completion synchronously inside a single Application step.
#[derive(Clone, Copy)]
pub struct HostFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub func: HostFn,
}

impl HostFunction {
    pub const fn new(name: &'static str, arity: Arity, func: HostFn) -> Self {
        HostFunction { name, arity, func }
    }

    #[inline]
    pub fn call(&self, ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
