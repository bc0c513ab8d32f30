// Property-based tests for comparison and merge.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use tabrecon_core::{Column, Dataset, SemanticType, Value};
use tabrecon_recon::structure::compare_structure;
use tabrecon_recon::{compare_all, merge, JoinKind, MergeOptions, ReconConfig};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small key space so both sides overlap and duplicate; occasionally null.
fn arb_key() -> impl Strategy<Value = Value> {
    prop_oneof![
        8 => (0i64..8).prop_map(Value::Int),
        1 => Just(Value::Null),
    ]
}

fn arb_amount() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (-50i64..50).prop_map(Value::Int),
        2 => (-50.0..50.0f64).prop_map(Value::Float),
        1 => Just(Value::Null),
    ]
}

fn arb_label() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => r"[a-c]{1,2}".prop_map(Value::Text),
        1 => Just(Value::Null),
    ]
}

/// A dataset with a numeric `key`, numeric `amount` and, optionally, a
/// `label` column typed either Text or Categorical.
fn arb_dataset() -> impl Strategy<Value = Dataset> {
    (0usize..12, any::<bool>(), any::<bool>())
        .prop_flat_map(|(n, with_label, categorical)| {
            (
                proptest::collection::vec(arb_key(), n),
                proptest::collection::vec(arb_amount(), n),
                proptest::collection::vec(arb_label(), n),
                Just(with_label),
                Just(categorical),
            )
        })
        .prop_map(|(keys, amounts, labels, with_label, categorical)| {
            let mut columns = vec![
                Column::new("key", SemanticType::Numeric, keys),
                Column::new("amount", SemanticType::Numeric, amounts),
            ];
            if with_label {
                let dtype = if categorical {
                    SemanticType::Categorical
                } else {
                    SemanticType::Text
                };
                columns.push(Column::new("label", dtype, labels));
            }
            Dataset::new(columns).expect("generated dataset is valid")
        })
}

fn distinct_keys(ds: &Dataset) -> usize {
    let keys: HashSet<Option<i64>> = ds
        .column("key")
        .unwrap()
        .values
        .iter()
        .map(|v| match v {
            Value::Int(i) => Some(*i),
            _ => None,
        })
        .collect();
    keys.len()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn row_partition_covers_distinct_keys(left in arb_dataset(), right in arb_dataset()) {
        let report = compare_all(&left, &right, Some(&["key"][..]), &ReconConfig::default());
        let rows = report.rows.expect("key exists on both sides");
        prop_assert_eq!(rows.total_only_left + rows.total_in_both, distinct_keys(&left));
        prop_assert_eq!(rows.total_only_right + rows.total_in_both, distinct_keys(&right));
        prop_assert_eq!(rows.total_in_both, rows.total_same + rows.total_differing);
    }

    #[test]
    fn differing_rows_have_cell_diffs(left in arb_dataset(), right in arb_dataset()) {
        let report = compare_all(&left, &right, Some(&["key"][..]), &ReconConfig::default());
        let rows = report.rows.unwrap();
        let cells = report.cells.unwrap();
        for pair in &rows.in_both_differing {
            prop_assert!(
                cells.entries.iter().any(|e| e.row_key == pair.key),
                "differing key {} has no cell diff", pair.key
            );
        }
        prop_assert_eq!(cells.total_differences, cells.entries.len());
    }

    #[test]
    fn self_comparison_is_clean(ds in arb_dataset()) {
        let report = compare_all(&ds, &ds.clone(), Some(&["key"][..]), &ReconConfig::default());
        let rows = report.rows.unwrap();
        prop_assert_eq!(rows.total_differing, 0);
        prop_assert_eq!(rows.total_only_left, 0);
        prop_assert_eq!(rows.total_only_right, 0);
        prop_assert!(report.cells.unwrap().entries.is_empty());
        prop_assert!(report.stats.differences.is_empty());
    }

    #[test]
    fn structure_is_symmetric(a in arb_dataset(), b in arb_dataset()) {
        let ab = compare_structure(&a, &b);
        let ba = compare_structure(&b, &a);
        prop_assert_eq!(&ab.columns_only_left, &ba.columns_only_right);
        prop_assert_eq!(&ab.columns_only_right, &ba.columns_only_left);
        prop_assert_eq!(&ab.columns_common, &ba.columns_common);

        let forward: Vec<_> = ab.dtype_mismatches.iter()
            .map(|m| (m.column.clone(), m.left_type, m.right_type))
            .collect();
        let swapped: Vec<_> = ba.dtype_mismatches.iter()
            .map(|m| (m.column.clone(), m.right_type, m.left_type))
            .collect();
        prop_assert_eq!(forward, swapped);
    }

    #[test]
    fn merge_is_deterministic(
        left in arb_dataset(),
        right in arb_dataset(),
        how in prop_oneof![
            Just(JoinKind::Inner),
            Just(JoinKind::Left),
            Just(JoinKind::Right),
            Just(JoinKind::Outer),
        ],
    ) {
        let opts = MergeOptions::on(["key"]).how(how);
        let r1 = merge(&left, &right, &opts).unwrap();
        let r2 = merge(&left, &right, &opts).unwrap();
        prop_assert!(r1.success);
        prop_assert_eq!(&r1.summary, &r2.summary);

        let s = &r1.summary;
        prop_assert_eq!(s.rows_result, s.matched_rows + s.unmatched_left + s.unmatched_right);
        prop_assert_eq!(s.rows_result, r1.dataset.n_rows());
        if !how.keeps_unmatched_left() {
            prop_assert_eq!(s.unmatched_left, 0);
        }
        if !how.keeps_unmatched_right() {
            prop_assert_eq!(s.unmatched_right, 0);
        }
    }
}
