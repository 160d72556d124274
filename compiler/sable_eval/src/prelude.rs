//! Host functions installed in the global frame.
//!
//! A minimal standard library: output, type predicates, a little math and
//! array helpers. Embedders add their own through
//! `MachineBuilder::host_functions`; an embedder function with a prelude
//! name replaces the prelude one.

use crate::errors::HostError;
use crate::host::{Arity, HostContext, HostFunction};
use crate::value::{format_number, Value};

/// Global functions.
pub const FUNCTIONS: &[HostFunction] = &[
    HostFunction::new("display", Arity::AtLeast(1), display),
    HostFunction::new("error", Arity::AtLeast(1), error),
    HostFunction::new("stringify", Arity::Exact(1), stringify),
    HostFunction::new("array_length", Arity::Exact(1), array_length),
    HostFunction::new("push", Arity::AtLeast(1), push),
    HostFunction::new("is_number", Arity::Exact(1), is_number),
    HostFunction::new("is_string", Arity::Exact(1), is_string),
    HostFunction::new("is_boolean", Arity::Exact(1), is_boolean),
    HostFunction::new("is_function", Arity::Exact(1), is_function),
    HostFunction::new("is_array", Arity::Exact(1), is_array),
    HostFunction::new("is_undefined", Arity::Exact(1), is_undefined),
    HostFunction::new("math_floor", Arity::Exact(1), math_floor),
    HostFunction::new("math_sqrt", Arity::Exact(1), math_sqrt),
];

/// Methods callable on arrays, `xs.push(1)`.
pub const ARRAY_METHODS: &[HostFunction] = &[
    HostFunction::new("push", Arity::AtLeast(0), array_push_method),
    HostFunction::new("pop", Arity::Exact(0), array_pop_method),
];

/// Global constants, `call_cc` included.
pub fn constants() -> [(&'static str, Value); 4] {
    [
        ("undefined", Value::Undefined),
        ("NaN", Value::Number(f64::NAN)),
        ("Infinity", Value::Number(f64::INFINITY)),
        ("call_cc", Value::CallCc),
    ]
}

fn join(args: &[Value]) -> String {
    args.iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

#[expect(clippy::cast_precision_loss, reason = "lengths are far below 2^52")]
fn length(len: usize) -> Value {
    Value::Number(len as f64)
}

/// `display(value, ...)`: print the arguments, return the first.
fn display(ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    ctx.print.println(&join(args));
    Ok(arg(args, 0))
}

/// `error(message, ...)`: abort with a host failure.
fn error(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Err(HostError::failed(join(args)))
}

fn stringify(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::string(arg(args, 0).stringify()))
}

fn array_length(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    match &arg(args, 0) {
        Value::Array(elements) => Ok(length(elements.borrow().len())),
        other => Err(HostError::failed(format!(
            "expected an array, found {}",
            other.describe()
        ))),
    }
}

/// `push(xs, value, ...)`: append, return the new length.
fn push(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    let Some((target, values)) = args.split_first() else {
        return Err(HostError::failed("push expects an array"));
    };
    append(target, values)
}

fn append(target: &Value, values: &[Value]) -> Result<Value, HostError> {
    match target {
        Value::Array(elements) => {
            let mut elements = elements.borrow_mut();
            elements.extend_from_slice(values);
            Ok(length(elements.len()))
        }
        other => Err(HostError::failed(format!(
            "cannot push onto {}",
            other.describe()
        ))),
    }
}

fn array_push_method(ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    let target = ctx.receiver.clone().unwrap_or(Value::Undefined);
    append(&target, args)
}

fn array_pop_method(ctx: &mut HostContext<'_>, _args: &[Value]) -> Result<Value, HostError> {
    match &ctx.receiver {
        Some(Value::Array(elements)) => Ok(elements.borrow_mut().pop().unwrap_or(Value::Undefined)),
        other => Err(HostError::failed(format!(
            "cannot pop from {}",
            other.as_ref().map_or_else(|| "nothing".to_string(), Value::describe)
        ))),
    }
}

fn is_number(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Number(_))))
}

fn is_string(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Str(_))))
}

fn is_boolean(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Bool(_))))
}

fn is_function(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Bool(arg(args, 0).is_callable()))
}

fn is_array(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))
}

fn is_undefined(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Undefined)))
}

fn number_arg(name: &str, args: &[Value]) -> Result<f64, HostError> {
    match arg(args, 0) {
        Value::Number(n) => Ok(n),
        other => Err(HostError::failed(format!(
            "{name} expects a number, found {}",
            other.describe()
        ))),
    }
}

fn math_floor(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Number(number_arg("math_floor", args)?.floor()))
}

fn math_sqrt(_ctx: &mut HostContext<'_>, args: &[Value]) -> Result<Value, HostError> {
    let n = number_arg("math_sqrt", args)?;
    if n < 0.0 {
        return Err(HostError::failed(format!(
            "math_sqrt of negative number {}",
            format_number(n)
        )));
    }
    Ok(Value::Number(n.sqrt()))
}
