//! Values passed to and returned from student functions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A TOML-expressible value.
///
/// Equality is structural and never coerces: `Integer(5)` is not
/// `Float(5.0)`, `Bool(true)` is not `Integer(1)` and `NaN` equals nothing.
/// Tables compare as maps, regardless of key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    #[default]
    None,
    Bool(bool),
    Integer(i64),
    Float(#[serde(with = "float_repr")] f64),
    String(String),
    Array(Vec<Literal>),
    Table(IndexMap<String, Literal>),
    /// A returned value with no literal form, kept as its `repr`.
    Opaque(String),
}

impl From<toml::Value> for Literal {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Literal::String(s),
            toml::Value::Integer(i) => Literal::Integer(i),
            toml::Value::Float(f) => Literal::Float(f),
            toml::Value::Boolean(b) => Literal::Bool(b),
            toml::Value::Datetime(dt) => Literal::String(dt.to_string()),
            toml::Value::Array(items) => {
                Literal::Array(items.into_iter().map(Literal::from).collect())
            }
            toml::Value::Table(table) => Literal::Table(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Literal::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => f.write_str("None"),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => f.write_str(&float_repr::to_repr(*x)),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Literal::Table(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Literal::Opaque(repr) => f.write_str(repr),
        }
    }
}

/// Render `args` the way they appear in a call, e.g. `1, "a", [2]`.
pub fn format_args(args: &[Literal]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Floats cross the interpreter boundary as their textual repr so that
/// infinities and NaN survive JSON.
pub mod float_repr {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn to_repr(value: f64) -> String {
        if value.is_nan() {
            "nan".to_string()
        } else if value.is_infinite() {
            if value > 0.0 { "inf" } else { "-inf" }.to_string()
        } else {
            format!("{:?}", value)
        }
    }

    pub fn from_repr(repr: &str) -> Option<f64> {
        match repr.trim().to_ascii_lowercase().as_str() {
            "nan" | "+nan" | "-nan" => Some(f64::NAN),
            "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
            "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
            other => other.parse().ok(),
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_repr(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let repr = String::deserialize(deserializer)?;
        from_repr(&repr)
            .ok_or_else(|| de::Error::custom(format!("invalid float repr '{}'", repr)))
    }
}
