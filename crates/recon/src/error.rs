use std::fmt;

use serde::Serialize;

use crate::model::{Finding, Side};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ReconError {
    /// A requested key column is absent from one side (comparison).
    Lookup { side: Side, column: String },
    /// Ambiguous or missing key specification (merge).
    Resolution(String),
    /// An ERROR-tagged validation finding blocked the merge.
    Validation(Vec<Finding>),
    /// The join itself could not be performed.
    Execution(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad tolerance, empty indicator name, etc.).
    ConfigValidation(String),
}

/// Closed classification of `ReconError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lookup,
    Resolution,
    Validation,
    Execution,
    Config,
}

impl ReconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Execution(_) => ErrorKind::Execution,
            Self::ConfigParse(_) | Self::ConfigValidation(_) => ErrorKind::Config,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup { side, column } => {
                write!(f, "key column '{column}' must exist in both datasets (missing from {side})")
            }
            Self::Resolution(msg) => write!(f, "key resolution error: {msg}"),
            Self::Validation(findings) => {
                write!(f, "validation failed")?;
                for finding in findings {
                    write!(f, "\n  {}", finding.message)?;
                }
                Ok(())
            }
            Self::Execution(msg) => write!(f, "merge failed: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
