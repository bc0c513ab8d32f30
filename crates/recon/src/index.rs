use rustc_hash::FxHashMap;
use tabrecon_core::{Dataset, KeyValue};

use crate::error::ReconError;
use crate::model::Side;

/// Resolve key column names to column indices, failing on the first absent one.
pub fn key_columns(ds: &Dataset, keys: &[&str], side: Side) -> Result<Vec<usize>, ReconError> {
    keys.iter()
        .map(|k| {
            ds.column_index(k).ok_or_else(|| ReconError::Lookup {
                side,
                column: k.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// First-occurrence index (comparison)
// ---------------------------------------------------------------------------

/// Key value -> first row carrying it, plus the distinct keys in first-seen
/// order. Built once per side per call.
#[derive(Debug)]
pub struct KeyIndex {
    first_row: FxHashMap<KeyValue, usize>,
    distinct: Vec<(KeyValue, usize)>,
}

impl KeyIndex {
    pub fn build(ds: &Dataset, key_cols: &[usize]) -> Self {
        let mut first_row = FxHashMap::default();
        let mut distinct = Vec::new();
        for row in 0..ds.n_rows() {
            let key = ds.key_at(row, key_cols);
            if !first_row.contains_key(&key) {
                first_row.insert(key.clone(), row);
                distinct.push((key, row));
            }
        }
        Self { first_row, distinct }
    }

    pub fn first_row(&self, key: &KeyValue) -> Option<usize> {
        self.first_row.get(key).copied()
    }

    pub fn contains(&self, key: &KeyValue) -> bool {
        self.first_row.contains_key(key)
    }

    /// Distinct keys with their first row, in first-seen order.
    pub fn distinct(&self) -> &[(KeyValue, usize)] {
        &self.distinct
    }

    pub fn len(&self) -> usize {
        self.distinct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct.is_empty()
    }
}

// ---------------------------------------------------------------------------
// All-occurrence index (joins)
// ---------------------------------------------------------------------------

/// Key value -> every row carrying it, in row order. Keys containing a null
/// are left out: they never match.
#[derive(Debug)]
pub struct JoinIndex {
    positions: FxHashMap<KeyValue, Vec<usize>>,
}

impl JoinIndex {
    pub fn build(ds: &Dataset, key_cols: &[usize]) -> Self {
        let mut positions: FxHashMap<KeyValue, Vec<usize>> = FxHashMap::default();
        for row in 0..ds.n_rows() {
            let key = ds.key_at(row, key_cols);
            if key.has_null() {
                continue;
            }
            positions.entry(key).or_default().push(row);
        }
        Self { positions }
    }

    pub fn matches(&self, key: &KeyValue) -> &[usize] {
        if key.has_null() {
            return &[];
        }
        self.positions.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
