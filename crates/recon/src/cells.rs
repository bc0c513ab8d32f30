use std::collections::BTreeMap;

use tabrecon_core::{Dataset, Value};

use crate::config::Tolerance;
use crate::error::ReconError;
use crate::model::{CellDiffEntry, CellReport, DiffKind, RowReport};
use crate::rows::{compared_columns, match_rows};

/// Classify a single cell change, or `None` when the values are equal.
///
/// Both null is equal; one null is `Filled` / `Nullified`; two numbers are
/// compared within `tolerance`; anything else by value.
pub fn cell_diff(old: &Value, new: &Value, tolerance: &Tolerance) -> Option<DiffKind> {
    match (old.is_null(), new.is_null()) {
        (true, true) => None,
        (true, false) => Some(DiffKind::Filled),
        (false, true) => Some(DiffKind::Nullified),
        (false, false) => {
            let equal = match (old.as_f64(), new.as_f64()) {
                (Some(a), Some(b)) => tolerance.is_close(a, b),
                _ => old == new,
            };
            (!equal).then_some(DiffKind::Changed)
        }
    }
}

/// Per-cell diffs for every matched row whose non-key values differ.
pub fn diff_cells(
    left: &Dataset,
    right: &Dataset,
    keys: &[&str],
    tolerance: &Tolerance,
) -> Result<CellReport, ReconError> {
    let rows = match_rows(left, right, keys, tolerance)?;
    Ok(diff_matched_rows(left, right, &rows, tolerance))
}

/// Cell diffs for the differing pairs of an existing `RowReport`.
pub fn diff_matched_rows(left: &Dataset, right: &Dataset, rows: &RowReport, tolerance: &Tolerance) -> CellReport {
    let keys: Vec<&str> = rows.key_columns.iter().map(String::as_str).collect();
    let compared = compared_columns(left, right, &keys);

    let mut entries = Vec::new();
    let mut column_diff_counts: BTreeMap<String, usize> = BTreeMap::new();

    for pair in &rows.in_both_differing {
        for &(name, li, ri) in &compared {
            let old = left.value(li, pair.left_row);
            let new = right.value(ri, pair.right_row);
            if let Some(kind) = cell_diff(old, new, tolerance) {
                entries.push(CellDiffEntry {
                    row_key: pair.key.clone(),
                    column: name.to_string(),
                    old_value: old.clone(),
                    new_value: new.clone(),
                    kind,
                });
                *column_diff_counts.entry(name.to_string()).or_insert(0) += 1;
            }
        }
    }

    CellReport {
        total_differences: entries.len(),
        entries,
        column_diff_counts,
    }
}
