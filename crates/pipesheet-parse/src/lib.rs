pub mod ast;
pub mod document;
pub mod expression;
mod precedence;
#[cfg(test)]
mod tests;

pub use ast::{BinOp, Cell, CellGrid, Expr};
pub use document::parse_document;
pub use expression::parse_expression;

// Re-export common types
pub use pipesheet_common::{CalcError, CalcErrorKind};
