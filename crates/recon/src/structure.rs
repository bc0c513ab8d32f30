use std::collections::BTreeSet;

use tabrecon_core::Dataset;

use crate::model::{DtypeMismatch, StructureReport};

/// Schema-level diff of two datasets. Never fails.
pub fn compare_structure(left: &Dataset, right: &Dataset) -> StructureReport {
    let left_cols: BTreeSet<&str> = left.column_names().into_iter().collect();
    let right_cols: BTreeSet<&str> = right.column_names().into_iter().collect();

    let columns_common: Vec<String> = left_cols.intersection(&right_cols).map(|c| c.to_string()).collect();

    let dtype_mismatches = columns_common
        .iter()
        .filter_map(|name| {
            let lt = left.column(name)?.dtype;
            let rt = right.column(name)?.dtype;
            (lt != rt).then(|| DtypeMismatch {
                column: name.clone(),
                left_type: lt,
                right_type: rt,
            })
        })
        .collect();

    StructureReport {
        columns_only_left: left_cols.difference(&right_cols).map(|c| c.to_string()).collect(),
        columns_only_right: right_cols.difference(&left_cols).map(|c| c.to_string()).collect(),
        columns_common,
        dtype_mismatches,
        rows_left: left.n_rows(),
        rows_right: right.n_rows(),
        cols_left: left.n_cols(),
        cols_right: right.n_cols(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabrecon_core::{Column, SemanticType, Value};

    fn col(name: &str, dtype: SemanticType, n: usize) -> Column {
        Column::new(name, dtype, vec![Value::Null; n])
    }

    #[test]
    fn partitions_columns_and_flags_types() {
        let left = Dataset::new(vec![
            col("id", SemanticType::Numeric, 2),
            col("zeta", SemanticType::Text, 2),
            col("amount", SemanticType::Numeric, 2),
            col("only_l", SemanticType::Boolean, 2),
        ])
        .unwrap();
        let right = Dataset::new(vec![
            col("amount", SemanticType::Text, 3),
            col("id", SemanticType::Numeric, 3),
            col("zeta", SemanticType::Categorical, 3),
            col("only_r", SemanticType::Datetime, 3),
        ])
        .unwrap();

        let report = compare_structure(&left, &right);
        assert_eq!(report.columns_common, vec!["amount", "id", "zeta"]);
        assert_eq!(report.columns_only_left, vec!["only_l"]);
        assert_eq!(report.columns_only_right, vec!["only_r"]);
        let mismatched: Vec<&str> = report.dtype_mismatches.iter().map(|m| m.column.as_str()).collect();
        assert_eq!(mismatched, vec!["amount", "zeta"]);
        assert_eq!(report.dtype_mismatches[0].left_type, SemanticType::Numeric);
        assert_eq!(report.dtype_mismatches[0].right_type, SemanticType::Text);
        assert_eq!((report.rows_left, report.rows_right), (2, 3));
        assert_eq!((report.cols_left, report.cols_right), (4, 4));
    }

    #[test]
    fn empty_datasets() {
        let report = compare_structure(&Dataset::empty(), &Dataset::empty());
        assert!(report.columns_common.is_empty());
        assert!(report.dtype_mismatches.is_empty());
        assert_eq!(report.rows_left, 0);
    }
}
