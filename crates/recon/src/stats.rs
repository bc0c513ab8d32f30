use std::collections::BTreeMap;

use tabrecon_core::{Column, Dataset, SemanticType};

use crate::config::Tolerance;
use crate::model::{NullCountDelta, NumericStats, NumericStatsPair, StatDifference, Statistic, StatsReport};

/// Null-count deltas for every common column, and mean/min/max/count for
/// every column that is numeric on both sides. Never fails.
pub fn compare_stats(left: &Dataset, right: &Dataset, tolerance: &Tolerance) -> StatsReport {
    let mut common: Vec<(&Column, &Column)> = left
        .columns()
        .iter()
        .filter_map(|lc| right.column(&lc.name).map(|rc| (lc, rc)))
        .collect();
    common.sort_by(|a, b| a.0.name.cmp(&b.0.name));

    let mut null_counts = BTreeMap::new();
    let mut numeric_stats = BTreeMap::new();
    let mut differences = Vec::new();

    for (lc, rc) in common {
        let (l_nulls, r_nulls) = (lc.null_count(), rc.null_count());
        null_counts.insert(
            lc.name.clone(),
            NullCountDelta {
                left: l_nulls,
                right: r_nulls,
                delta: r_nulls as i64 - l_nulls as i64,
            },
        );

        if lc.dtype != SemanticType::Numeric || rc.dtype != SemanticType::Numeric {
            continue;
        }

        let pair = NumericStatsPair {
            left: numeric_stats_of(lc),
            right: numeric_stats_of(rc),
        };
        for stat in Statistic::ALL {
            let (lv, rv) = (stat.of(&pair.left), stat.of(&pair.right));
            if !tolerance.is_close(lv, rv) {
                differences.push(StatDifference {
                    column: lc.name.clone(),
                    statistic: stat,
                    left_value: lv,
                    right_value: rv,
                });
            }
        }
        numeric_stats.insert(lc.name.clone(), pair);
    }

    StatsReport {
        null_counts,
        numeric_stats,
        differences,
    }
}

/// Statistics over the non-missing values. NaN when there are none.
pub fn numeric_stats_of(column: &Column) -> NumericStats {
    let values: Vec<f64> = column
        .values
        .iter()
        .filter(|v| !v.is_missing())
        .filter_map(|v| v.as_f64())
        .collect();

    if values.is_empty() {
        return NumericStats {
            mean: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            count: 0,
        };
    }

    let sum: f64 = values.iter().sum();
    NumericStats {
        mean: sum / values.len() as f64,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        count: values.len(),
    }
}
