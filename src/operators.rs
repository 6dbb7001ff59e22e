//! Built-in operator semantics for values that do not overload them.
//!
//! Invalid operand combinations do **not** raise: arithmetic on them yields
//! `None`, equality yields `False` (`True` for `!=`) and ordering yields
//! `False`. Programs may rely on that soft failure.
//!
//! Numeric promotion: `Bool` counts as the integer `0`/`1`. A result is an
//! `Int` only when both operands are integer-like, otherwise a `Float`.
//! Integer `+ - *` wrap on overflow; `/` always divides in floating point.
//! A string repetition too large to allocate is `None` as well.

use std::cmp::Ordering;
use std::rc::Rc;

use log::debug;

use crate::token::TokenType;
use crate::value::Value;

/// Method an instance on the left of `op` may define to override it.
pub fn magic_method(op: &TokenType) -> Option<&'static str> {
    let name = match op {
        TokenType::PLUS => "__add__",
        TokenType::MINUS => "__sub__",
        TokenType::STAR => "__mul__",
        TokenType::SLASH => "__truediv__",
        TokenType::DOUBLE_SLASH => "__floordiv__",
        TokenType::PERCENT => "__mod__",
        TokenType::DOUBLE_STAR => "__pow__",
        TokenType::LESS => "__lt__",
        TokenType::LESS_EQUAL => "__le__",
        TokenType::GREATER => "__gt__",
        TokenType::GREATER_EQUAL => "__ge__",
        TokenType::EQUAL_EQUAL => "__eq__",
        TokenType::BANG_EQUAL => "__ne__",
        _ => return None,
    };

    Some(name)
}

/// Apply a non-logical binary operator to two evaluated operands.
pub fn binary(op: &TokenType, left: &Value, right: &Value) -> Value {
    let result = match op {
        TokenType::PLUS => add(left, right),

        TokenType::STAR => multiply(left, right),

        TokenType::MINUS
        | TokenType::SLASH
        | TokenType::DOUBLE_SLASH
        | TokenType::PERCENT
        | TokenType::DOUBLE_STAR => arithmetic(op, left, right),

        TokenType::EQUAL_EQUAL
        | TokenType::BANG_EQUAL
        | TokenType::LESS
        | TokenType::LESS_EQUAL
        | TokenType::GREATER
        | TokenType::GREATER_EQUAL => Value::Bool(compare(op, left, right)),

        _ => Value::None,
    };

    debug!("{} {:?} {} => {}", left, op, right, result);

    result
}

/// Unary minus. `Bool` negates to an `Int`; anything non-numeric is `None`.
pub fn negate(operand: &Value) -> Value {
    match operand {
        Value::Int(n) => Value::Int(n.wrapping_neg()),
        Value::Float(n) => Value::Float(-n),
        Value::Bool(b) => Value::Int(-i64::from(*b)),
        _ => Value::None,
    }
}

fn add(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Value::Str(s)
        }

        _ => arithmetic(&TokenType::PLUS, left, right),
    }
}

fn multiply(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => repeat(s, *n),

        _ => arithmetic(&TokenType::STAR, left, right),
    }
}

/// `None` when the repeated string cannot be allocated.
fn repeat(s: &str, times: i64) -> Value {
    let n: usize = match usize::try_from(times) {
        Ok(n) if n > 0 && !s.is_empty() => n,
        _ => return Value::Str(String::new()),
    };

    let mut out = String::new();

    let reserved = s
        .len()
        .checked_mul(n)
        .is_some_and(|len| out.try_reserve_exact(len).is_ok());

    if !reserved {
        debug!("Cannot repeat a {}-byte string {} times", s.len(), n);
        return Value::None;
    }

    for _ in 0..n {
        out.push_str(s);
    }

    Value::Str(out)
}

fn arithmetic(op: &TokenType, left: &Value, right: &Value) -> Value {
    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return int_arithmetic(op, a, b);
    }

    match (left.as_number(), right.as_number()) {
        (Some((a, _)), Some((b, _))) => float_arithmetic(op, a, b),
        _ => Value::None,
    }
}

fn int_arithmetic(op: &TokenType, a: i64, b: i64) -> Value {
    match op {
        TokenType::PLUS => Value::Int(a.wrapping_add(b)),
        TokenType::MINUS => Value::Int(a.wrapping_sub(b)),
        TokenType::STAR => Value::Int(a.wrapping_mul(b)),
        TokenType::SLASH => Value::Float(a as f64 / b as f64),

        // Integer division by zero has no integer result.
        TokenType::DOUBLE_SLASH if b == 0 => Value::None,
        TokenType::PERCENT if b == 0 => Value::None,
        TokenType::DOUBLE_SLASH => Value::Int(floor_div(a, b)),
        TokenType::PERCENT => Value::Int(floor_mod(a, b)),

        TokenType::DOUBLE_STAR => Value::Int(int_pow(a, b)),

        _ => Value::None,
    }
}

fn float_arithmetic(op: &TokenType, a: f64, b: f64) -> Value {
    match op {
        TokenType::PLUS => Value::Float(a + b),
        TokenType::MINUS => Value::Float(a - b),
        TokenType::STAR => Value::Float(a * b),
        TokenType::SLASH => Value::Float(a / b),
        TokenType::DOUBLE_SLASH => Value::Float((a / b).floor()),
        TokenType::PERCENT => Value::Float(a - (a / b).floor() * b),
        TokenType::DOUBLE_STAR => Value::Float(a.powf(b)),
        _ => Value::None,
    }
}

/// Quotient rounded towards negative infinity. `b` must be non-zero.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);

    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// `a - floor(a / b) * b`; the result takes the sign of `b`.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);

    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

/// Exact when the result fits; otherwise the floating-point power truncated
/// back to an integer (so negative exponents give `0`, `1` or `-1`).
fn int_pow(base: i64, exp: i64) -> i64 {
    u32::try_from(exp)
        .ok()
        .and_then(|e| base.checked_pow(e))
        .unwrap_or_else(|| (base as f64).powf(exp as f64) as i64)
}

fn compare(op: &TokenType, left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => return ordering_holds(op, a.cmp(b)),

        (Value::None, Value::None) => return matches!(op, TokenType::EQUAL_EQUAL),

        (Value::Function(a), Value::Function(b)) => return identity(op, Rc::ptr_eq(a, b)),

        (Value::Class(a), Value::Class(b)) => return identity(op, Rc::ptr_eq(a, b)),

        (Value::Instance(a), Value::Instance(b)) => return identity(op, Rc::ptr_eq(a, b)),

        _ => {}
    }

    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return ordering_holds(op, a.cmp(&b));
    }

    if let (Some((a, _)), Some((b, _))) = (left.as_number(), right.as_number()) {
        return match op {
            TokenType::EQUAL_EQUAL => a == b,
            TokenType::BANG_EQUAL => a != b,
            TokenType::LESS => a < b,
            TokenType::LESS_EQUAL => a <= b,
            TokenType::GREATER => a > b,
            TokenType::GREATER_EQUAL => a >= b,
            _ => false,
        };
    }

    // Unrelated types: only `!=` holds.
    matches!(op, TokenType::BANG_EQUAL)
}

fn ordering_holds(op: &TokenType, ordering: Ordering) -> bool {
    match op {
        TokenType::EQUAL_EQUAL => ordering == Ordering::Equal,
        TokenType::BANG_EQUAL => ordering != Ordering::Equal,
        TokenType::LESS => ordering == Ordering::Less,
        TokenType::LESS_EQUAL => ordering != Ordering::Greater,
        TokenType::GREATER => ordering == Ordering::Greater,
        TokenType::GREATER_EQUAL => ordering != Ordering::Less,
        _ => false,
    }
}

/// Objects are only ever equal to themselves and have no ordering.
fn identity(op: &TokenType, same: bool) -> bool {
    match op {
        TokenType::EQUAL_EQUAL => same,
        TokenType::BANG_EQUAL => !same,
        _ => false,
    }
}
