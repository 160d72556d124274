//! Runtime values.
//!
//! Scalars are stored inline; strings are shared `Rc<str>`; arrays and
//! objects are shared mutable cells, so aliasing (`const b = a; b[0] = 1;`)
//! is observable exactly as in a reference interpreter.

use std::cell::RefCell;
use std::fmt;
use std::fmt::Write;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use sable_ir::{Name, NodeId};

use crate::continuation::Continuation;
use crate::environment::Env;
use crate::host::HostFunction;

/// Nesting depth after which `stringify` elides contents.
const MAX_PRINT_DEPTH: usize = 16;

/// Values written by one `stringify` before the rest is elided. Shared
/// (non-cyclic) substructure is printed once per reference, so depth alone
/// does not bound the output.
const MAX_PRINT_VALUES: usize = 10_000;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<Object>>),
    Closure(Rc<Closure>),
    Host(Rc<HostFunction>),
    /// The `call_cc` primitive.
    CallCc,
    Continuation(Rc<Continuation>),
}

/// A function value: the `Function` node plus the environment it closes over.
///
/// Immutable after creation. Parameters and body are read from the tree
/// through `node` when the closure is applied.
pub struct Closure {
    pub node: NodeId,
    pub name: Option<Name>,
    pub arity: usize,
    pub env: Env,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("node", &self.node)
            .field("arity", &self.arity)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

/// An object: string keys in insertion order.
#[derive(Clone, Default)]
pub struct Object {
    entries: Vec<(Rc<str>, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v)
    }

    /// Insert or overwrite a property.
    pub fn set(&mut self, key: Rc<str>, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (&**k, v))
    }
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create an array value.
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Create an object value.
    pub fn object(object: Object) -> Self {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    /// The type name used in runtime type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Closure(_) | Value::Host(_) | Value::CallCc | Value::Continuation(_) => {
                "function"
            }
        }
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        self.type_name() == "function"
    }

    /// Host-language truthiness, used when runtime checks are off.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Host-language numeric coercion, used when runtime checks are off.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }

    /// Index into an array: a non-negative integral number.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "checked non-negative and integral"
            )]
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) => {
                Some(*n as usize)
            }
            _ => None,
        }
    }

    /// `===`: identity for arrays, objects and functions, value otherwise.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            #[allow(clippy::float_cmp, reason = "=== compares exactly")]
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Host(a), Value::Host(b)) => Rc::ptr_eq(a, b),
            (Value::CallCc, Value::CallCc) => true,
            (Value::Continuation(a), Value::Continuation(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Source-like rendering: strings are quoted.
    pub fn stringify(&self) -> String {
        let mut printer = Printer {
            out: String::new(),
            open: FxHashSet::default(),
            remaining: MAX_PRINT_VALUES,
        };
        printer.write(self, 0);
        printer.out
    }

    /// Rendering for `display` and string concatenation: top-level strings
    /// are written raw.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            other => other.stringify(),
        }
    }

    /// `type value` for error messages, e.g. `string "a"`.
    pub fn describe(&self) -> String {
        match self {
            Value::Undefined | Value::Null => self.type_name().to_string(),
            Value::Closure(_) | Value::Host(_) | Value::CallCc | Value::Continuation(_) => {
                self.stringify()
            }
            _ => format!("{} {}", self.type_name(), self.stringify()),
        }
    }
}

/// One `stringify` pass. `open` holds the arrays and objects currently being
/// written; meeting one again means the value contains itself.
struct Printer {
    out: String,
    open: FxHashSet<*const ()>,
    remaining: usize,
}

impl Printer {
    fn write(&mut self, value: &Value, depth: usize) {
        if self.remaining == 0 {
            self.out.push_str("...");
            return;
        }
        self.remaining -= 1;

        let out = &mut self.out;
        match value {
            Value::Undefined => out.push_str("undefined"),
            Value::Null => out.push_str("null"),
            Value::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Value::Number(n) => out.push_str(&format_number(*n)),
            Value::Str(s) => {
                let _ = write!(out, "{:?}", &**s);
            }
            Value::Array(elements) => {
                if depth >= MAX_PRINT_DEPTH {
                    out.push_str("[...]");
                    return;
                }
                let id = Rc::as_ptr(elements).cast::<()>();
                if !self.open.insert(id) {
                    self.out.push_str("<circular>");
                    return;
                }
                self.out.push('[');
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    if self.remaining == 0 {
                        self.out.push_str("...");
                        break;
                    }
                    self.write(element, depth + 1);
                }
                self.out.push(']');
                self.open.remove(&id);
            }
            Value::Object(object) => {
                if depth >= MAX_PRINT_DEPTH {
                    out.push_str("{...}");
                    return;
                }
                let id = Rc::as_ptr(object).cast::<()>();
                if !self.open.insert(id) {
                    self.out.push_str("<circular>");
                    return;
                }
                let object = object.borrow();
                if object.is_empty() {
                    self.out.push_str("{}");
                } else {
                    self.out.push('{');
                    for (i, (key, value)) in object.iter().enumerate() {
                        if i > 0 {
                            self.out.push(',');
                        }
                        if self.remaining == 0 {
                            self.out.push_str(" ...");
                            break;
                        }
                        let _ = write!(self.out, " {key:?}: ");
                        self.write(value, depth + 1);
                    }
                    self.out.push_str(" }");
                }
                self.open.remove(&id);
            }
            Value::Closure(closure) => match closure.name {
                Some(_) => {
                    let _ = write!(out, "<function/{}>", closure.arity);
                }
                None => {
                    let _ = write!(out, "<lambda/{}>", closure.arity);
                }
            },
            Value::Host(host) => {
                let _ = write!(out, "<builtin {}>", host.name);
            }
            Value::CallCc => out.push_str("<builtin call_cc>"),
            Value::Continuation(_) => out.push_str("<continuation>"),
        }
    }
}

/// Render a number the way the host language prints it: integral values
/// without a fraction, `NaN`, `Infinity`, `-0` as `0`, and exponent
/// notation (`1e+21`, `1.5e-7`) outside `1e-6 <= |n| < 1e21`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&n.abs()) {
        n.to_string()
    } else {
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests;
