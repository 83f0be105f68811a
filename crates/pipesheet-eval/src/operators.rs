//! Infix operator semantics over [`Value`] operands.
//!
//! Numeric pairs promote to float as soon as either side is a float. `+`
//! with a string on the left concatenates, rendering the right side the way
//! it would print in a cell. Everything else is a type mismatch.

use pipesheet_common::{CalcError, CalcErrorKind, Value};
use pipesheet_parse::BinOp;

pub(crate) fn apply(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, CalcError> {
    match op {
        BinOp::Add => add(lhs, rhs),
        BinOp::Sub => arithmetic("Subtraction", lhs, rhs, i64::wrapping_sub, |l, r| l - r),
        BinOp::Mul => arithmetic("Multiplication", lhs, rhs, i64::wrapping_mul, |l, r| l * r),
        BinOp::Div => div(lhs, rhs),
    }
}

/// `<=` over numeric operands, backing the `bte` builtin.
pub(crate) fn lte(lhs: &Value, rhs: &Value) -> Result<bool, CalcError> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Ok(l <= r),
        (Value::Int(l), Value::Float(r)) => Ok((*l as f64) <= *r),
        (Value::Float(l), Value::Int(r)) => Ok(*l <= *r as f64),
        (Value::Float(l), Value::Float(r)) => Ok(l <= r),
        _ => Err(mismatch("Comparison", lhs, rhs)),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value, CalcError> {
    match (&lhs, &rhs) {
        (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_add(*r))),
        (Value::Int(l), Value::Float(r)) => Ok(Value::Float(*l as f64 + r)),
        (Value::Float(l), Value::Int(r)) => Ok(Value::Float(l + *r as f64)),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l + r)),
        (Value::Text(l), Value::Int(_) | Value::Float(_) | Value::Text(_)) => {
            Ok(Value::Text(format!("{l}{rhs}")))
        }
        _ => Err(mismatch("Addition", &lhs, &rhs)),
    }
}

fn arithmetic(
    name: &str,
    lhs: Value,
    rhs: Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, CalcError> {
    match (&lhs, &rhs) {
        (Value::Int(l), Value::Int(r)) => Ok(Value::Int(int_op(*l, *r))),
        (Value::Int(l), Value::Float(r)) => Ok(Value::Float(float_op(*l as f64, *r))),
        (Value::Float(l), Value::Int(r)) => Ok(Value::Float(float_op(*l, *r as f64))),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(float_op(*l, *r))),
        (Value::Text(_), _) => Err(string_mismatch(name)),
        _ => Err(mismatch(name, &lhs, &rhs)),
    }
}

fn div(lhs: Value, rhs: Value) -> Result<Value, CalcError> {
    match (&lhs, &rhs) {
        (Value::Int(l), Value::Int(r)) => {
            nonzero(*r == 0)?;
            Ok(Value::Int(l.wrapping_div(*r)))
        }
        (Value::Int(l), Value::Float(r)) => {
            nonzero(*r == 0.0)?;
            Ok(Value::Float(*l as f64 / r))
        }
        (Value::Float(l), Value::Int(r)) => {
            nonzero(*r == 0)?;
            Ok(Value::Float(l / *r as f64))
        }
        (Value::Float(l), Value::Float(r)) => {
            nonzero(*r == 0.0)?;
            Ok(Value::Float(l / r))
        }
        (Value::Text(_), _) => Err(string_mismatch("Division")),
        _ => Err(mismatch("Division", &lhs, &rhs)),
    }
}

fn nonzero(divisor_is_zero: bool) -> Result<(), CalcError> {
    if divisor_is_zero {
        Err(CalcError::new(CalcErrorKind::DivisionByZero))
    } else {
        Ok(())
    }
}

fn string_mismatch(name: &str) -> CalcError {
    CalcError::new(CalcErrorKind::TypeMismatch)
        .with_message(format!("{name} not supported for strings"))
}

fn mismatch(name: &str, l: &Value, r: &Value) -> CalcError {
    CalcError::new(CalcErrorKind::TypeMismatch).with_message(format!(
        "{name} not supported between {} and {}",
        l.type_name(),
        r.type_name()
    ))
}
