use std::fmt;

use crate::dtype::SemanticType;

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// Two columns share a name.
    DuplicateColumn(String),
    /// A column's length differs from the first column's.
    LengthMismatch { column: String, expected: usize, found: usize },
    /// A cell value does not fit the column's declared type.
    ValueType { column: String, row: usize, dtype: SemanticType, value: String },
    /// A referenced column does not exist.
    MissingColumn(String),
    /// Row-wise append of two columns whose types cannot be unified.
    IncompatibleConcat { column: String, left: SemanticType, right: SemanticType },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumn(name) => write!(f, "duplicate column '{name}'"),
            Self::LengthMismatch { column, expected, found } => {
                write!(f, "column '{column}' has {found} rows, expected {expected}")
            }
            Self::ValueType { column, row, dtype, value } => {
                write!(f, "column '{column}' row {row}: value {value} is not {dtype}")
            }
            Self::MissingColumn(name) => write!(f, "column '{name}' not found"),
            Self::IncompatibleConcat { column, left, right } => {
                write!(f, "cannot append column '{column}': {left} vs {right}")
            }
        }
    }
}

impl std::error::Error for DatasetError {}
