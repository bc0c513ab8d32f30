use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::value::Value;

/// Hashable projection of a `Value` used for key matching.
///
/// Integral floats collapse onto `Int` so `1` and `1.0` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyAtom {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Datetime(NaiveDateTime),
    Text(String),
}

impl From<&Value> for KeyAtom {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(v) => Self::Bool(*v),
            Value::Int(v) => Self::Int(*v),
            Value::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 {
                    Self::Int(*v as i64)
                } else {
                    Self::Float(OrderedFloat(*v))
                }
            }
            Value::Datetime(v) => Self::Datetime(*v),
            Value::Text(v) => Self::Text(v.clone()),
        }
    }
}

/// Tuple of key atoms for one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValue(pub Vec<KeyAtom>);

impl KeyValue {
    pub fn has_null(&self) -> bool {
        self.0.iter().any(|a| matches!(a, KeyAtom::Null))
    }
}

/// Reporting form of a row's key: the bare value for a single key column,
/// the full tuple otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowKey {
    Single(Value),
    Composite(Vec<Value>),
}

impl RowKey {
    pub fn from_values(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            Self::Single(values.remove(0))
        } else {
            Self::Composite(values)
        }
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(v) => write!(f, "{v}"),
            Self::Composite(values) => {
                f.write_str("(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
        }
    }
}
