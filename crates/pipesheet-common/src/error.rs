//! The single error type shared by the parser and the evaluation engine.
//!
//! Every fatal condition carries a [`CalcErrorKind`], an optional human
//! message, and (where known) the grid location it arose at. There are no
//! recoverable errors anywhere in the core: a parse error aborts the whole
//! document, an evaluation error aborts the whole pass.

use std::{error::Error, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed set of failure categories.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CalcErrorKind {
    /// Malformed document or formula text.
    Parse,
    /// Function name missing from the registry.
    UnknownFunction,
    /// Operand or argument of an unsupported type, or wrong arity.
    TypeMismatch,
    /// Label not visible from the referencing row.
    UnresolvedLabel,
    /// `^^` used in the first row.
    CopyAtRowZero,
    /// `X^v` scanned past the top of the grid without finding the column.
    ColumnNotFound,
    /// Zero divisor in `/`.
    DivisionByZero,
    /// Reference target outside the grid or past a short row's width.
    OutOfBounds,
    /// A cell's formula depends on the cell itself.
    CyclicReference,
}

impl fmt::Display for CalcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse error",
            Self::UnknownFunction => "unknown function",
            Self::TypeMismatch => "type mismatch",
            Self::UnresolvedLabel => "unresolved label",
            Self::CopyAtRowZero => "copy above at row 0",
            Self::ColumnNotFound => "column not found",
            Self::DivisionByZero => "division by zero",
            Self::OutOfBounds => "reference out of bounds",
            Self::CyclicReference => "cyclic reference",
        })
    }
}

/// 0-based grid coordinates of the cell an error arose at.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CellLocation {
    pub row: usize,
    pub col: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalcError {
    pub kind: CalcErrorKind,
    pub message: Option<String>,
    pub location: Option<CellLocation>,
}

impl From<CalcErrorKind> for CalcError {
    fn from(kind: CalcErrorKind) -> Self {
        Self {
            kind,
            message: None,
            location: None,
        }
    }
}

impl CalcError {
    pub fn new(kind: CalcErrorKind) -> Self {
        kind.into()
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Attach the grid coordinates the error arose at. Keeps an already
    /// recorded location, so the innermost cell wins as the error bubbles
    /// up through reference chains.
    pub fn with_location(mut self, row: usize, col: usize) -> Self {
        if self.location.is_none() {
            self.location = Some(CellLocation { row, col });
        }
        self
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        if let Some(loc) = self.location {
            write!(f, " (row {}, col {})", loc.row, loc.col)?;
        }
        Ok(())
    }
}

impl Error for CalcError {}
