use tabrecon_core::Dataset;

use crate::cells::cell_diff;
use crate::config::Tolerance;
use crate::error::ReconError;
use crate::index::{key_columns, KeyIndex};
use crate::model::{KeyedRow, MatchedRow, RowReport, Side};

/// A non-key column present on both sides: (name, left index, right index).
pub(crate) type ComparedColumn<'a> = (&'a str, usize, usize);

/// Common non-key columns, in the left dataset's column order.
pub(crate) fn compared_columns<'a>(left: &'a Dataset, right: &Dataset, keys: &[&str]) -> Vec<ComparedColumn<'a>> {
    left.columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| !keys.contains(&c.name.as_str()))
        .filter_map(|(li, c)| right.column_index(&c.name).map(|ri| (c.name.as_str(), li, ri)))
        .collect()
}

/// Partition rows by key into only-left / only-right / in-both, and split
/// in-both pairs into same / differing.
///
/// Duplicate keys collapse onto their first occurrence on each side; the
/// merge path reports duplicates instead.
pub fn match_rows(
    left: &Dataset,
    right: &Dataset,
    keys: &[&str],
    tolerance: &Tolerance,
) -> Result<RowReport, ReconError> {
    if keys.is_empty() {
        return Err(ReconError::Resolution("at least one key column is required".into()));
    }
    let left_keys = key_columns(left, keys, Side::Left)?;
    let right_keys = key_columns(right, keys, Side::Right)?;

    let left_index = KeyIndex::build(left, &left_keys);
    let right_index = KeyIndex::build(right, &right_keys);
    let compared = compared_columns(left, right, keys);

    let mut only_left = Vec::new();
    let mut in_both_same = Vec::new();
    let mut in_both_differing = Vec::new();

    for (key, left_row) in left_index.distinct() {
        let Some(right_row) = right_index.first_row(key) else {
            only_left.push(KeyedRow {
                key: left.row_key(*left_row, &left_keys),
                row: *left_row,
            });
            continue;
        };

        let differs = compared.iter().any(|&(_, li, ri)| {
            cell_diff(left.value(li, *left_row), right.value(ri, right_row), tolerance).is_some()
        });
        let pair = MatchedRow {
            key: left.row_key(*left_row, &left_keys),
            left_row: *left_row,
            right_row,
        };
        if differs {
            in_both_differing.push(pair);
        } else {
            in_both_same.push(pair);
        }
    }

    let only_right: Vec<KeyedRow> = right_index
        .distinct()
        .iter()
        .filter(|(key, _)| !left_index.contains(key))
        .map(|(_, row)| KeyedRow {
            key: right.row_key(*row, &right_keys),
            row: *row,
        })
        .collect();

    log::debug!(
        "row match on {:?}: {} only-left, {} only-right, {} same, {} differing",
        keys,
        only_left.len(),
        only_right.len(),
        in_both_same.len(),
        in_both_differing.len()
    );

    Ok(RowReport {
        key_columns: keys.iter().map(|k| k.to_string()).collect(),
        total_only_left: only_left.len(),
        total_only_right: only_right.len(),
        total_in_both: in_both_same.len() + in_both_differing.len(),
        total_same: in_both_same.len(),
        total_differing: in_both_differing.len(),
        only_left,
        only_right,
        in_both_same,
        in_both_differing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabrecon_core::{Column, RowKey, SemanticType, Value};

    fn ds(ids: Vec<Value>, names: Vec<Value>) -> Dataset {
        Dataset::new(vec![
            Column::new("id", SemanticType::Numeric, ids),
            Column::new("name", SemanticType::Text, names),
        ])
        .unwrap()
    }

    #[test]
    fn partitions_keys() {
        let left = ds(vec![Value::Int(1), Value::Int(2)], vec!["a".into(), "b".into()]);
        let right = ds(vec![Value::Int(2), Value::Int(3)], vec!["b".into(), "c".into()]);
        let report = match_rows(&left, &right, &["id"], &Tolerance::default()).unwrap();
        assert_eq!(report.total_only_left, 1);
        assert_eq!(report.only_left[0].key, RowKey::Single(Value::Int(1)));
        assert_eq!(report.total_only_right, 1);
        assert_eq!(report.only_right[0].key, RowKey::Single(Value::Int(3)));
        assert_eq!(report.only_right[0].row, 1);
        assert_eq!(report.total_in_both, 1);
        assert_eq!(report.total_differing, 0);
        assert_eq!(report.total_same, 1);
    }

    #[test]
    fn duplicates_use_first_occurrence() {
        let left = ds(vec![Value::Int(1), Value::Int(1)], vec!["a".into(), "z".into()]);
        let right = ds(vec![Value::Int(1)], vec!["a".into()]);
        let report = match_rows(&left, &right, &["id"], &Tolerance::default()).unwrap();
        assert_eq!(report.total_in_both, 1);
        assert_eq!(report.total_differing, 0);
        assert_eq!(report.in_both_same[0].left_row, 0);
    }

    #[test]
    fn null_handling() {
        let left = ds(vec![Value::Int(1), Value::Int(2)], vec![Value::Null, "b".into()]);
        let right = ds(vec![Value::Int(1), Value::Int(2)], vec![Value::Null, Value::Null]);
        let report = match_rows(&left, &right, &["id"], &Tolerance::default()).unwrap();
        assert_eq!(report.total_same, 1);
        assert_eq!(report.total_differing, 1);
        assert_eq!(report.in_both_differing[0].key, RowKey::Single(Value::Int(2)));
    }

    #[test]
    fn numeric_values_use_tolerance() {
        let left = Dataset::new(vec![
            Column::new("id", SemanticType::Numeric, vec![Value::Int(1)]),
            Column::new("x", SemanticType::Numeric, vec![Value::Float(0.1 + 0.2)]),
        ])
        .unwrap();
        let right = Dataset::new(vec![
            Column::new("id", SemanticType::Numeric, vec![Value::Int(1)]),
            Column::new("x", SemanticType::Numeric, vec![Value::Float(0.3)]),
        ])
        .unwrap();
        let report = match_rows(&left, &right, &["id"], &Tolerance::default()).unwrap();
        assert_eq!(report.total_differing, 0);
    }

    #[test]
    fn missing_key_is_lookup_error() {
        let left = ds(vec![Value::Int(1)], vec!["a".into()]);
        let right = Dataset::new(vec![Column::new("name", SemanticType::Text, vec!["a".into()])]).unwrap();
        let err = match_rows(&left, &right, &["id"], &Tolerance::default()).unwrap_err();
        assert!(matches!(err, ReconError::Lookup { side: Side::Right, .. }));
    }

    #[test]
    fn materialises_row_sets() {
        let left = ds(vec![Value::Int(1), Value::Int(2)], vec!["a".into(), "b".into()]);
        let right = ds(vec![Value::Int(2), Value::Int(3)], vec!["x".into(), "c".into()]);
        let report = match_rows(&left, &right, &["id"], &Tolerance::default()).unwrap();
        let only_left = report.rows_only_left(&left);
        assert_eq!(only_left.n_rows(), 1);
        assert_eq!(only_left.column("name").unwrap().values, vec![Value::from("a")]);
        assert_eq!(report.rows_in_both_differing(&left).n_rows(), 1);
        assert_eq!(report.rows_in_both(&left).n_rows(), 0);
        assert_eq!(report.rows_only_right(&right).column("id").unwrap().values, vec![Value::Int(3)]);
    }
}
