use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One parsed unit of input text. Rows may have different lengths; nothing
/// forces the grid to be rectangular.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    String(String),
    Label(String),
    Formula(Expr),
    Empty,
}

/// A parsed document: one `Vec<Cell>` per input line, ragged widths allowed.
pub type CellGrid = Vec<Vec<Cell>>;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinOp {
    Mul,
    Div,
    Add,
    Sub,
}

impl Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Add => "+",
            BinOp::Sub => "-",
        })
    }
}

/// Formula expression tree. Children are always structurally smaller, so no
/// cycles can be built.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Infix {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        op: BinOp,
    },
    FunCall {
        name: String,
        args: Vec<Expr>,
    },
    /// `D2`: column letter plus 1-based row.
    CellRef {
        col: char,
        row: usize,
    },
    /// `^^`: reuse the formula (or value) of the cell directly above.
    CopyAbove,
    /// `E^`: plain value read of the given column, one row up.
    CopyColumnAbove {
        col: char,
    },
    /// `E^v`: value of the given column in the nearest row above that is
    /// wide enough to have it.
    CopyLastInColumn {
        col: char,
    },
    /// `@name<2>`: cell at (label row + offset, label column).
    LabelRef {
        label: String,
        offset: i64,
    },
}

/// Infix operands that are themselves infix render parenthesized, making the
/// applied precedence visible: `(1 + (2 * 3)) + 4`.
fn fmt_operand(e: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match e {
        Expr::Infix { .. } => write!(f, "({e})"),
        _ => write!(f, "{e}"),
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(i) => write!(f, "{i}"),
            Expr::Float(n) => write!(f, "{n:.3}"),
            Expr::Str(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Expr::Infix { lhs, rhs, op } => {
                fmt_operand(lhs, f)?;
                write!(f, " {op} ")?;
                fmt_operand(rhs, f)
            }
            Expr::FunCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::CellRef { col, row } => write!(f, "{col}{row}"),
            Expr::CopyAbove => f.write_str("^^"),
            Expr::CopyColumnAbove { col } => write!(f, "{col}^"),
            Expr::CopyLastInColumn { col } => write!(f, "{col}^v"),
            Expr::LabelRef { label, offset } => write!(f, "@{label}<{offset}>"),
        }
    }
}
