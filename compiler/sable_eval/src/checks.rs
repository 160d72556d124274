//! Runtime type checks and operator semantics.
//!
//! Each operator first validates its operands against the active
//! `RuntimeChecks`, then computes. A failed check is raised before any
//! effect applies. With a check disabled the operator falls back to
//! host-language coercions (truthiness, numeric coercion, string
//! concatenation).
//!
//! Errors returned here carry no location; the machine attaches the span of
//! the node that queued the operator.

use std::cmp::Ordering;

use bitflags::bitflags;
use sable_ir::{BinaryOp, LogicalOp, UnaryOp};

use crate::errors::{
    binary_type_mismatch, conditional_type_mismatch, logical_type_mismatch, member_type_mismatch,
    unary_type_mismatch, EvalError, EvalResult, Side,
};
use crate::value::{Object, Value};

bitflags! {
    /// Which operator families are type-checked at run time.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct RuntimeChecks: u8 {
        /// `!` needs a boolean, unary `-` a number.
        const UNARY = 1 << 0;
        /// Arithmetic and comparison operand types.
        const BINARY = 1 << 1;
        /// `&&`/`||` left operand must be boolean.
        const LOGICAL = 1 << 2;
        /// `if`, `?:` and loop tests must be boolean.
        const CONDITIONAL = 1 << 3;
        /// Member access needs array+index or object+string key.
        const MEMBER = 1 << 4;
    }
}

/// Language level of the program being run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LanguageLevel {
    /// A teaching sublanguage: every runtime check is active.
    Source { chapter: u8 },
    /// Host-language semantics: no checks, host coercions.
    Native,
}

impl Default for LanguageLevel {
    fn default() -> Self {
        LanguageLevel::Source { chapter: 4 }
    }
}

impl LanguageLevel {
    pub fn checks(self) -> RuntimeChecks {
        match self {
            LanguageLevel::Source { .. } => RuntimeChecks::all(),
            LanguageLevel::Native => RuntimeChecks::empty(),
        }
    }
}

pub fn unary(op: UnaryOp, operand: Value, checks: RuntimeChecks) -> EvalResult {
    let checked = checks.contains(RuntimeChecks::UNARY);
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Not, found) if checked => Err(unary_type_mismatch(op, "boolean", found)),
        (UnaryOp::Neg, found) if checked => Err(unary_type_mismatch(op, "number", found)),
        (UnaryOp::Not, other) => Ok(Value::Bool(!other.is_truthy())),
        (UnaryOp::Neg, other) => Ok(Value::Number(-other.to_number())),
    }
}

pub fn binary(op: BinaryOp, left: Value, right: Value, checks: RuntimeChecks) -> EvalResult {
    if op.is_equality() {
        let equal = left.strict_equals(&right);
        return Ok(Value::Bool(if op == BinaryOp::StrictEq {
            equal
        } else {
            !equal
        }));
    }
    if checks.contains(RuntimeChecks::BINARY) {
        check_binary_operands(op, &left, &right)?;
    }
    Ok(match op {
        BinaryOp::Add => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::string(format!(
                "{}{}",
                left.to_display_string(),
                right.to_display_string()
            )),
            _ => Value::Number(left.to_number() + right.to_number()),
        },
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Mod => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = match (&left, &right) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => left.to_number().partial_cmp(&right.to_number()),
            };
            Value::Bool(compare(op, ordering))
        }
        // handled above
        BinaryOp::StrictEq | BinaryOp::StrictNotEq => Value::Undefined,
    })
}

fn compare(op: BinaryOp, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    }
}

fn check_binary_operands(op: BinaryOp, left: &Value, right: &Value) -> Result<(), EvalError> {
    let mismatch = |side: Side, expected: &'static str, found: &Value| -> Result<(), EvalError> {
        Err(binary_type_mismatch(op, side, expected, found.clone()))
    };
    match op {
        BinaryOp::Add | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            match (left, right) {
                (Value::Number(_), Value::Number(_)) | (Value::Str(_), Value::Str(_)) => Ok(()),
                (Value::Number(_), other) => mismatch(Side::Right, "number", other),
                (Value::Str(_), other) => mismatch(Side::Right, "string", other),
                (other, _) => mismatch(Side::Left, "number or string", other),
            }
        }
        _ => match (left, right) {
            (Value::Number(_), Value::Number(_)) => Ok(()),
            (Value::Number(_), other) => mismatch(Side::Right, "number", other),
            (other, _) => mismatch(Side::Left, "number", other),
        },
    }
}

/// Truth value of the left operand of `&&`/`||`.
pub fn check_logical(op: LogicalOp, left: &Value, checks: RuntimeChecks) -> Result<bool, EvalError> {
    match left {
        Value::Bool(b) => Ok(*b),
        other if checks.contains(RuntimeChecks::LOGICAL) => {
            Err(logical_type_mismatch(op, other.clone()))
        }
        other => Ok(other.is_truthy()),
    }
}

/// Truth value of an `if`, `?:` or loop test. `context` names the construct.
pub fn check_condition(
    context: &'static str,
    test: &Value,
    checks: RuntimeChecks,
) -> Result<bool, EvalError> {
    match test {
        Value::Bool(b) => Ok(*b),
        other if checks.contains(RuntimeChecks::CONDITIONAL) => {
            Err(conditional_type_mismatch(context, other.clone()))
        }
        other => Ok(other.is_truthy()),
    }
}

const LENGTH: &str = "length";

/// `object[key]`.
pub fn member_get(object: &Value, key: &Value, checks: RuntimeChecks) -> EvalResult {
    let checked = checks.contains(RuntimeChecks::MEMBER);
    match object {
        Value::Array(elements) => {
            if let Some(index) = key.as_index() {
                return Ok(elements.borrow().get(index).cloned().unwrap_or(Value::Undefined));
            }
            match key {
                Value::Str(s) if &**s == LENGTH => Ok(length(elements.borrow().len())),
                _ if checked => Err(member_type_mismatch(
                    "index",
                    "non-negative integer",
                    key.clone(),
                )),
                _ => Ok(Value::Undefined),
            }
        }
        Value::Object(object) => match key {
            Value::Str(s) => Ok(object.borrow().get(s).cloned().unwrap_or(Value::Undefined)),
            _ if checked => Err(member_type_mismatch("key", "string", key.clone())),
            other => Ok(object
                .borrow()
                .get(&other.to_display_string())
                .cloned()
                .unwrap_or(Value::Undefined)),
        },
        Value::Str(s) => match key {
            Value::Str(k) if &**k == LENGTH => Ok(length(s.chars().count())),
            _ if checked => Err(member_type_mismatch(
                "object",
                "array or object",
                object.clone(),
            )),
            _ => Ok(key
                .as_index()
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::string(c.to_string()))),
        },
        Value::Undefined | Value::Null => Err(member_type_mismatch(
            "object",
            "array or object",
            object.clone(),
        )),
        _ if checked => Err(member_type_mismatch(
            "object",
            "array or object",
            object.clone(),
        )),
        _ => Ok(Value::Undefined),
    }
}

/// How far past its end an array write may extend the array. The gap is
/// filled with `undefined`, so an unbounded index would allocate without
/// limit.
pub const MAX_ARRAY_GAP: usize = 1 << 16;

/// `object[key] = value`. Writing past the end of an array extends it by at
/// most [`MAX_ARRAY_GAP`] elements.
pub fn member_set(
    object: &Value,
    key: &Value,
    value: Value,
    checks: RuntimeChecks,
) -> Result<(), EvalError> {
    let checked = checks.contains(RuntimeChecks::MEMBER);
    match object {
        Value::Array(elements) => match key.as_index() {
            Some(index) => {
                let mut elements = elements.borrow_mut();
                if index.saturating_sub(elements.len()) > MAX_ARRAY_GAP {
                    return Err(member_type_mismatch(
                        "index",
                        "an index at most 65536 past the end of the array",
                        key.clone(),
                    ));
                }
                if index >= elements.len() {
                    elements.resize(index + 1, Value::Undefined);
                }
                elements[index] = value;
                Ok(())
            }
            None if checked => Err(member_type_mismatch(
                "index",
                "non-negative integer",
                key.clone(),
            )),
            None => Ok(()),
        },
        Value::Object(object) => {
            set_property(&mut object.borrow_mut(), key, value, checked)
        }
        Value::Undefined | Value::Null => Err(member_type_mismatch(
            "object",
            "array or object",
            object.clone(),
        )),
        _ if checked => Err(member_type_mismatch(
            "object",
            "array or object",
            object.clone(),
        )),
        _ => Ok(()),
    }
}

fn set_property(
    object: &mut Object,
    key: &Value,
    value: Value,
    checked: bool,
) -> Result<(), EvalError> {
    match key {
        Value::Str(s) => {
            object.set(s.clone(), value);
            Ok(())
        }
        _ if checked => Err(member_type_mismatch("key", "string", key.clone())),
        other => {
            object.set(other.to_display_string().into(), value);
            Ok(())
        }
    }
}

#[expect(clippy::cast_precision_loss, reason = "lengths are far below 2^52")]
fn length(len: usize) -> Value {
    Value::Number(len as f64)
}
