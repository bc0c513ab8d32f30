use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dtype::SemanticType;
use crate::error::DatasetError;
use crate::key::{KeyAtom, KeyValue, RowKey};
use crate::value::{parse_datetime, Value};

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: SemanticType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: SemanticType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Nulls plus NaN floats.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Number of distinct non-null values.
    pub fn distinct_non_null_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .map(KeyAtom::from)
            .collect::<HashSet<_>>()
            .len()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Ordered, named, typed columns sharing one row count.
///
/// Construction validates unique names, equal lengths, and that every value
/// fits its column type. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<Column>,
    #[serde(skip_serializing)]
    n_rows: usize,
}

#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<Column>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DatasetError;

    fn try_from(mut raw: RawDataset) -> Result<Self, Self::Error> {
        // Cells arrive as text; only datetime columns parse them. Unparseable
        // strings stay text and fail the type check below.
        for col in raw.columns.iter_mut().filter(|c| c.dtype == SemanticType::Datetime) {
            for v in col.values.iter_mut() {
                if let Some(dt) = v.as_text().and_then(parse_datetime) {
                    *v = Value::Datetime(dt);
                }
            }
        }
        Dataset::new(raw.columns)
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != n_rows {
                return Err(DatasetError::LengthMismatch {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
            if let Some((row, value)) = col.values.iter().enumerate().find(|(_, v)| !v.fits(col.dtype)) {
                return Err(DatasetError::ValueType {
                    column: col.name.clone(),
                    row,
                    dtype: col.dtype,
                    value: value.to_string(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// No columns, no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            n_rows: 0,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell at (column index, row). Panics if either is out of range.
    pub fn value(&self, col: usize, row: usize) -> &Value {
        &self.columns[col].values[row]
    }

    pub fn key_at(&self, row: usize, key_cols: &[usize]) -> KeyValue {
        KeyValue(key_cols.iter().map(|&c| KeyAtom::from(self.value(c, row))).collect())
    }

    pub fn row_key(&self, row: usize, key_cols: &[usize]) -> RowKey {
        RowKey::from_values(key_cols.iter().map(|&c| self.value(c, row).clone()).collect())
    }

    /// New dataset holding the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype,
                values: rows.iter().map(|&r| c.values[r].clone()).collect(),
            })
            .collect();
        Dataset {
            columns,
            n_rows: rows.len(),
        }
    }

    /// Projection onto the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Dataset, DatasetError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let col = self
                .column(name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))?;
            columns.push(col.clone());
        }
        Dataset::new(columns)
    }

    /// Row-wise append. Columns are the union of both sides (this side's
    /// order first); cells a side lacks are filled with nulls.
    pub fn concat_rows(&self, other: &Dataset) -> Result<Dataset, DatasetError> {
        let mut columns = Vec::new();

        for col in &self.columns {
            let (dtype, tail) = match other.column(&col.name) {
                Some(o) => (unify_concat(&col.name, col.dtype, o.dtype)?, o.values.clone()),
                None => (col.dtype, vec![Value::Null; other.n_rows]),
            };
            let mut values = col.values.clone();
            values.extend(tail);
            columns.push(Column::new(col.name.clone(), dtype, values));
        }

        for col in other.columns.iter().filter(|c| !self.has_column(&c.name)) {
            let mut values = vec![Value::Null; self.n_rows];
            values.extend(col.values.iter().cloned());
            columns.push(Column::new(col.name.clone(), col.dtype, values));
        }

        Dataset::new(columns)
    }
}

fn unify_concat(column: &str, left: SemanticType, right: SemanticType) -> Result<SemanticType, DatasetError> {
    if left == right {
        return Ok(left);
    }
    if left.is_join_compatible_with(right) {
        return Ok(SemanticType::Text);
    }
    Err(DatasetError::IncompatibleConcat {
        column: column.to_string(),
        left,
        right,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
