//! `tabrecon-core`: dataset model shared by the reconciliation engine and CLI.
//!
//! A `Dataset` is an ordered list of named, typed columns sharing one row
//! count. The engine only ever reads datasets; every transformation here
//! returns a new value.

pub mod dataset;
pub mod dtype;
pub mod error;
pub mod key;
pub mod value;

pub use dataset::{Column, Dataset};
pub use dtype::SemanticType;
pub use error::DatasetError;
pub use key::{KeyAtom, KeyValue, RowKey};
pub use value::{parse_datetime, Value};
