//! Meta crate that re-exports the pipesheet building blocks with sensible
//! defaults, plus the one piece that lives outside the core pipeline: the
//! text renderer that turns an evaluated grid back into pipe-delimited
//! output. Downstream users can depend on this crate and opt into specific
//! layers via feature flags while keeping access to the underlying crates
//! when deeper integration is required.

#[cfg(feature = "common")]
pub use pipesheet_common as common;

#[cfg(feature = "parse")]
pub use pipesheet_parse as parse;

#[cfg(feature = "eval")]
pub use pipesheet_eval as eval;

#[cfg(feature = "common")]
pub use pipesheet_common::{CalcError, CalcErrorKind, CellLocation, Value};

#[cfg(feature = "parse")]
pub use pipesheet_parse::{BinOp, Cell, CellGrid, Expr, parse_document, parse_expression};

#[cfg(feature = "eval")]
pub use pipesheet_eval::{
    Engine, Function, FunctionContext, FunctionRegistry, ValueGrid, default_registry,
};

/// Renders an evaluated grid as pipe-delimited text: cells joined by `" |"`
/// (space before the delimiter, none after), one newline-terminated line
/// per row. Zero-cell rows come out as bare newlines.
#[cfg(feature = "common")]
pub fn render_grid(values: &[Vec<Value>]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for row in values {
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.push_str(" |");
            }
            let _ = write!(out, "{value}");
        }
        out.push('\n');
    }
    out
}

/// Parses, evaluates, and re-renders a whole document with the builtin
/// function set.
///
/// ```
/// let out = pipesheet::process("=1+2*3|=concat(\"a\", \"b\")")?;
/// assert_eq!(out, "7 |ab\n");
/// # Ok::<(), pipesheet::CalcError>(())
/// ```
#[cfg(feature = "eval")]
pub fn process(input: &str) -> Result<String, CalcError> {
    let grid = parse_document(input)?;
    let values = Engine::default().evaluate(&grid)?;
    Ok(render_grid(&values))
}
