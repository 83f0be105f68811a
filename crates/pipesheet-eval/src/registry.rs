use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use pipesheet_common::{CalcError, CalcErrorKind, Value};

use crate::builtins;
use crate::function::{Function, FunctionContext};

/// Name → function map handed to the engine at construction time.
///
/// The registry is a plain value: tests build their own with counting or
/// mock functions, embedders can extend the built-in set, and
/// [`Engine::default`](crate::Engine::default) shares one process-wide
/// builtin instance.
#[derive(Default)]
pub struct FunctionRegistry {
    fns: FxHashMap<&'static str, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding exactly the fixed built-in library.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        builtins::register_builtins(&mut reg);
        reg
    }

    /// Registers under `f.name()`, replacing any previous entry of that
    /// name.
    pub fn register(&mut self, f: Arc<dyn Function>) {
        self.fns.insert(f.name(), f);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Function>> {
        self.fns.get(name)
    }

    /// Look up `name`, check the flattened argument list against its arity,
    /// and invoke it.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[Value],
        ctx: &FunctionContext,
    ) -> Result<Value, CalcError> {
        let Some(f) = self.fns.get(name) else {
            return Err(CalcError::new(CalcErrorKind::UnknownFunction)
                .with_message(format!("function not found: {name}")));
        };
        check_arity(f.as_ref(), args.len())?;
        f.eval(args, ctx)
    }
}

fn check_arity(f: &dyn Function, got: usize) -> Result<(), CalcError> {
    let min = f.min_args();
    if got < min || (!f.variadic() && got > min) {
        let want = if f.variadic() {
            format!("at least {min}")
        } else {
            format!("exactly {min}")
        };
        let plural = if min == 1 { "" } else { "s" };
        return Err(CalcError::new(CalcErrorKind::TypeMismatch).with_message(format!(
            "{}() expects {want} argument{plural}, got {got}",
            f.name()
        )));
    }
    Ok(())
}

static DEFAULT_REGISTRY: Lazy<Arc<FunctionRegistry>> =
    Lazy::new(|| Arc::new(FunctionRegistry::with_builtins()));

/// The shared built-in registry used by `Engine::default()`.
pub fn default_registry() -> Arc<FunctionRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}
