use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A runtime value produced by evaluating a cell.
///
/// `Multi` is a realized list (e.g. the result of `split`); `Spread` is the
/// same payload re-tagged by `spread(..)` so that function-call argument
/// evaluation splices it into the surrounding argument list.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Multi(Vec<Value>),
    Spread(Vec<Value>),
}

impl Value {
    /// Short type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Bool(_) => "bool",
            Value::Multi(_) => "multi",
            Value::Spread(_) => "spread",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Canonical text rendering. Same as `Display`; handy where a `String`
    /// is needed outright (`text`, `concat`, string concatenation).
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Default for Value {
    /// The value of an empty cell.
    fn default() -> Self {
        Value::Text(String::new())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Floats always render with exactly 3 decimal digits.
            Value::Float(n) => write!(f, "{n:.3}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Multi(items) | Value::Spread(items) => write_list(f, items),
        }
    }
}
