//! The fixed built-in function library.
//!
//! Arity is declared through [`Function::min_args`]/[`Function::variadic`]
//! and checked by the registry before `eval` runs, so the bodies here only
//! validate argument *types*. `Spread` never reaches a builtin: the engine
//! splices spread arguments into the flat list at call time.

use std::sync::Arc;

use pipesheet_common::{CalcError, CalcErrorKind, Value};

use crate::function::{Function, FunctionContext};
use crate::operators;
use crate::registry::FunctionRegistry;

/// Installs the whole builtin set into `reg`.
pub fn register_builtins(reg: &mut FunctionRegistry) {
    reg.register(Arc::new(SumFn));
    reg.register(Arc::new(BteFn));
    reg.register(Arc::new(TextFn));
    reg.register(Arc::new(IncFromFn));
    reg.register(Arc::new(ConcatFn));
    reg.register(Arc::new(SplitFn));
    reg.register(Arc::new(SpreadFn));
}

fn type_mismatch(msg: String) -> CalcError {
    CalcError::new(CalcErrorKind::TypeMismatch).with_message(msg)
}

/* ─────────────────────────── sum() ──────────────────────────── */

/// Adds every argument as a float. Numeric strings are coerced, so summing
/// the output of `split` works directly.
#[derive(Debug)]
pub struct SumFn;

impl Function for SumFn {
    fn name(&self) -> &'static str {
        "sum"
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, CalcError> {
        let mut total = 0.0;
        for arg in args {
            total += match arg {
                Value::Int(i) => *i as f64,
                Value::Float(f) => *f,
                Value::Text(s) => s.parse::<f64>().map_err(|_| {
                    type_mismatch(format!(
                        "couldn't convert sum() argument {s:?} to a number"
                    ))
                })?,
                other => {
                    return Err(type_mismatch(format!(
                        "sum() does not accept {} arguments",
                        other.type_name()
                    )));
                }
            };
        }
        Ok(Value::Float(total))
    }
}

/* ─────────────────────────── bte() ──────────────────────────── */

/// `bte(a, b)` is `a <= b` over numeric operands.
#[derive(Debug)]
pub struct BteFn;

impl Function for BteFn {
    fn name(&self) -> &'static str {
        "bte"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, CalcError> {
        operators::lte(&args[0], &args[1]).map(Value::Bool)
    }
}

/* ─────────────────────────── text() ─────────────────────────── */

/// Renders any value to its cell text.
#[derive(Debug)]
pub struct TextFn;

impl Function for TextFn {
    fn name(&self) -> &'static str {
        "text"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, CalcError> {
        Ok(Value::Text(args[0].render()))
    }
}

/* ─────────────────────────── incFrom() ──────────────────────── */

/// `incFrom(n)` yields `n` plus the calling cell's copy generation: the
/// seed cell evaluates to `n`, the first `^^` copy to `n + 1`, and so on.
#[derive(Debug)]
pub struct IncFromFn;

impl Function for IncFromFn {
    fn name(&self) -> &'static str {
        "incFrom"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, CalcError> {
        match args[0] {
            Value::Int(n) => Ok(Value::Int(n.wrapping_add(ctx.copy_count))),
            ref other => Err(type_mismatch(format!(
                "incFrom() expects an int argument, got {}",
                other.type_name()
            ))),
        }
    }
}

/* ─────────────────────────── concat() ───────────────────────── */

#[derive(Debug)]
pub struct ConcatFn;

impl Function for ConcatFn {
    fn name(&self) -> &'static str {
        "concat"
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, CalcError> {
        let mut out = String::new();
        for arg in args {
            out.push_str(&arg.render());
        }
        Ok(Value::Text(out))
    }
}

/* ─────────────────────────── split() ────────────────────────── */

/// Splits a string into a multi-value. An empty separator splits into
/// characters, with no empty edge pieces.
#[derive(Debug)]
pub struct SplitFn;

impl Function for SplitFn {
    fn name(&self) -> &'static str {
        "split"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, CalcError> {
        let Value::Text(s) = &args[0] else {
            return Err(type_mismatch(format!(
                "split() first argument must be a string, got {}",
                args[0].type_name()
            )));
        };
        let Value::Text(sep) = &args[1] else {
            return Err(type_mismatch(format!(
                "split() second argument must be a string, got {}",
                args[1].type_name()
            )));
        };
        let parts: Vec<Value> = if sep.is_empty() {
            s.chars().map(|c| Value::Text(c.to_string())).collect()
        } else {
            s.split(sep.as_str())
                .map(|p| Value::Text(p.to_owned()))
                .collect()
        };
        Ok(Value::Multi(parts))
    }
}

/* ─────────────────────────── spread() ───────────────────────── */

/// Re-tags a multi-value so the enclosing call splices its elements into
/// the argument list.
#[derive(Debug)]
pub struct SpreadFn;

impl Function for SpreadFn {
    fn name(&self) -> &'static str {
        "spread"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, CalcError> {
        match &args[0] {
            Value::Multi(items) => Ok(Value::Spread(items.clone())),
            other => Err(type_mismatch(format!(
                "spread() expects a multi-value argument, got {}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FunctionContext {
        FunctionContext {
            row: 3,
            col: 1,
            copy_count: 0,
        }
    }

    fn texts(parts: &[&str]) -> Vec<Value> {
        parts.iter().map(|p| Value::Text((*p).into())).collect()
    }

    #[test]
    fn sum_coerces_ints_floats_and_numeric_strings() {
        let args = [
            Value::Int(40),
            Value::Float(0.5),
            Value::Text("86".into()),
        ];
        assert_eq!(SumFn.eval(&args, &ctx()).unwrap(), Value::Float(126.5));
        assert_eq!(SumFn.eval(&[], &ctx()).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn sum_rejects_non_numeric_arguments() {
        let err = SumFn
            .eval(&[Value::Text("btc".into())], &ctx())
            .unwrap_err();
        assert_eq!(err.kind, CalcErrorKind::TypeMismatch);
        assert!(err.message.unwrap().contains("\"btc\""));

        let err = SumFn.eval(&[Value::Bool(true)], &ctx()).unwrap_err();
        assert_eq!(err.kind, CalcErrorKind::TypeMismatch);
    }

    #[test]
    fn bte_is_less_or_equal() {
        let args = [Value::Int(2), Value::Int(2)];
        assert_eq!(BteFn.eval(&args, &ctx()).unwrap(), Value::Bool(true));
        let args = [Value::Float(3.5), Value::Int(3)];
        assert_eq!(BteFn.eval(&args, &ctx()).unwrap(), Value::Bool(false));
        let args = [Value::Text("x".into()), Value::Int(1)];
        assert!(BteFn.eval(&args, &ctx()).is_err());
    }

    #[test]
    fn text_renders_like_a_cell() {
        let out = TextFn.eval(&[Value::Float(1.0)], &ctx()).unwrap();
        assert_eq!(out, Value::Text("1.000".into()));
        let out = TextFn.eval(&[Value::Bool(false)], &ctx()).unwrap();
        assert_eq!(out, Value::Text("false".into()));
    }

    #[test]
    fn inc_from_adds_the_copy_generation() {
        let mut c = ctx();
        assert_eq!(
            IncFromFn.eval(&[Value::Int(1)], &c).unwrap(),
            Value::Int(1)
        );
        c.copy_count = 2;
        assert_eq!(
            IncFromFn.eval(&[Value::Int(1)], &c).unwrap(),
            Value::Int(3)
        );
        let err = IncFromFn.eval(&[Value::Float(1.0)], &c).unwrap_err();
        assert_eq!(err.kind, CalcErrorKind::TypeMismatch);
    }

    #[test]
    fn inc_from_wraps_like_int_arithmetic() {
        // the first `^^` copy of `=incFrom(i64::MAX)`
        let mut c = ctx();
        c.copy_count = 1;
        assert_eq!(
            IncFromFn.eval(&[Value::Int(i64::MAX)], &c).unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn concat_renders_every_argument() {
        let args = [
            Value::Text("x".into()),
            Value::Int(2),
            Value::Float(0.09),
        ];
        assert_eq!(
            ConcatFn.eval(&args, &ctx()).unwrap(),
            Value::Text("x20.090".into())
        );
        assert_eq!(ConcatFn.eval(&[], &ctx()).unwrap(), Value::Text("".into()));
    }

    #[test]
    fn split_on_separator() {
        let args = [Value::Text("btc,eth,dai".into()), Value::Text(",".into())];
        assert_eq!(
            SplitFn.eval(&args, &ctx()).unwrap(),
            Value::Multi(texts(&["btc", "eth", "dai"]))
        );
    }

    #[test]
    fn split_keeps_interior_empty_pieces() {
        let args = [Value::Text("a,,b".into()), Value::Text(",".into())];
        assert_eq!(
            SplitFn.eval(&args, &ctx()).unwrap(),
            Value::Multi(texts(&["a", "", "b"]))
        );
        let args = [Value::Text("".into()), Value::Text(",".into())];
        assert_eq!(
            SplitFn.eval(&args, &ctx()).unwrap(),
            Value::Multi(texts(&[""]))
        );
    }

    #[test]
    fn split_with_empty_separator_yields_characters() {
        let args = [Value::Text("abc".into()), Value::Text("".into())];
        assert_eq!(
            SplitFn.eval(&args, &ctx()).unwrap(),
            Value::Multi(texts(&["a", "b", "c"]))
        );
        let args = [Value::Text("".into()), Value::Text("".into())];
        assert_eq!(SplitFn.eval(&args, &ctx()).unwrap(), Value::Multi(vec![]));
    }

    #[test]
    fn split_requires_string_arguments() {
        let args = [Value::Int(1), Value::Text(",".into())];
        let err = SplitFn.eval(&args, &ctx()).unwrap_err();
        assert!(err.message.unwrap().contains("first argument"));
        let args = [Value::Text("a".into()), Value::Int(1)];
        let err = SplitFn.eval(&args, &ctx()).unwrap_err();
        assert!(err.message.unwrap().contains("second argument"));
    }

    #[test]
    fn spread_retags_a_multi_value() {
        let items = texts(&["a", "b"]);
        let out = SpreadFn
            .eval(&[Value::Multi(items.clone())], &ctx())
            .unwrap();
        assert_eq!(out, Value::Spread(items));

        let err = SpreadFn.eval(&[Value::Int(1)], &ctx()).unwrap_err();
        assert_eq!(err.kind, CalcErrorKind::TypeMismatch);
    }
}
