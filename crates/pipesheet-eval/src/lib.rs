pub mod builtins;
pub mod engine;
pub mod function;
pub mod labels;
mod operators;
pub mod registry;

pub use engine::{Engine, ValueGrid};
pub use function::{Function, FunctionContext};
pub use labels::{LabelDef, LabelSnapshot, index_labels};
pub use registry::{FunctionRegistry, default_registry};

// Re-export the types evaluation consumes and produces
pub use pipesheet_common::{CalcError, CalcErrorKind, Value};
pub use pipesheet_parse::{Cell, CellGrid, Expr};
