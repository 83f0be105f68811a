use pipesheet_common::{CalcError, Value};

/// Position and copy state of the cell a function call runs in.
#[derive(Debug, Copy, Clone)]
pub struct FunctionContext {
    pub row: usize,
    pub col: usize,
    /// Consecutive `^^` steps that produced this cell's formula. `incFrom`
    /// adds it to its argument, which is what makes a copied formula count
    /// up as it propagates down a column.
    pub copy_count: i64,
}

/// A named operation over already-evaluated (and spread-flattened)
/// argument values.
///
/// Implementations are registered in a
/// [`FunctionRegistry`](crate::FunctionRegistry) and looked up by exact
/// name at call time. Arity is enforced at dispatch from `min_args` and
/// `variadic`; argument types are the implementation's business.
pub trait Function: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Required argument count, exact unless [`variadic`](Self::variadic).
    fn min_args(&self) -> usize {
        0
    }

    /// Whether arguments beyond `min_args` are accepted.
    fn variadic(&self) -> bool {
        false
    }

    fn eval(&self, args: &[Value], ctx: &FunctionContext) -> Result<Value, CalcError>;
}
