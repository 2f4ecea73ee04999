//! Raw property values as they arrive from tileset metadata

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw tile property
///
/// Tileset metadata stores each property as a string next to a type hint
/// (`type="int"`); [`Value::parse_typed`] turns such a pair into a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    /// Explicitly empty; treated as absent by the validator
    #[default]
    Null,
    Bool(bool),
    /// Hit points, defense, counts, reward bounds
    Int(i64),
    /// Probabilities and `drop_max`
    Float(f64),
    String(String),
}

/// Property name to raw value, in declaration order
pub type PropertyBag = IndexMap<String, Value>;

impl Value {
    /// Parse a metadata string according to its type hint
    ///
    /// A missing hint means string. Returns `None` when the text does not
    /// match the hint or the hint is not one of `bool`, `int`, `float`, `string`.
    pub fn parse_typed(type_hint: Option<&str>, raw: &str) -> Option<Self> {
        match type_hint.unwrap_or("string") {
            "string" => Some(Value::String(raw.to_string())),
            "bool" => match raw.trim() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            "int" => raw.trim().parse().ok().map(Value::Int),
            "float" => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Integer value; floats are not truncated
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Numeric value, widening ints
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name used in type-mismatch reports
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => String,
    &str => String,
}
