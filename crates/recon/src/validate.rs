use rustc_hash::FxHashMap;
use tabrecon_core::{Dataset, KeyValue};

use crate::model::{Finding, FindingKind, JoinKind, ResolvedKeys, Severity, Side};

/// Pre-flight checks for a proposed join.
///
/// Missing key columns are ERRORs and stop the remaining checks. Otherwise
/// type incompatibility, duplicate keys and null keys are WARNINGs.
pub fn validate_join(left: &Dataset, right: &Dataset, keys: &ResolvedKeys, how: JoinKind) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (ds, side, names) in [(left, Side::Left, &keys.left), (right, Side::Right, &keys.right)] {
        for name in names.iter().filter(|n| !ds.has_column(n)) {
            findings.push(Finding {
                severity: Severity::Error,
                kind: FindingKind::MissingKey {
                    side,
                    column: name.clone(),
                },
                message: format!("ERROR: Key '{name}' not found in {side} dataset"),
            });
        }
    }
    if !findings.is_empty() {
        log_findings(&findings, how);
        return findings;
    }

    for (lk, rk) in keys.pairs() {
        let (Some(lc), Some(rc)) = (left.column(lk), right.column(rk)) else {
            continue;
        };
        if !lc.dtype.is_compatible_with(rc.dtype) {
            findings.push(Finding {
                severity: Severity::Warning,
                kind: FindingKind::DtypeMismatch {
                    left_column: lk.to_string(),
                    right_column: rk.to_string(),
                    left_type: lc.dtype,
                    right_type: rc.dtype,
                },
                message: format!(
                    "WARNING: Type mismatch for keys: left[{lk}]={}, right[{rk}]={}",
                    lc.dtype, rc.dtype
                ),
            });
        }
    }

    let left_keys = key_tuples(left, &keys.left);
    let right_keys = key_tuples(right, &keys.right);

    for (side, tuples) in [(Side::Left, &left_keys), (Side::Right, &right_keys)] {
        let rows = duplicate_rows(tuples);
        if rows > 0 {
            findings.push(Finding {
                severity: Severity::Warning,
                kind: FindingKind::DuplicateKeys { side, rows },
                message: format!(
                    "WARNING: {rows} duplicate key rows in {side} (may produce row multiplication)"
                ),
            });
        }
    }

    for (side, tuples) in [(Side::Left, &left_keys), (Side::Right, &right_keys)] {
        let rows = tuples.iter().filter(|k| k.has_null()).count();
        if rows > 0 {
            findings.push(Finding {
                severity: Severity::Warning,
                kind: FindingKind::NullKeys { side, rows },
                message: format!("WARNING: {rows} rows with NA in join keys ({side})"),
            });
        }
    }

    log_findings(&findings, how);
    findings
}

fn key_tuples(ds: &Dataset, names: &[String]) -> Vec<KeyValue> {
    let cols: Vec<usize> = names.iter().filter_map(|n| ds.column_index(n)).collect();
    (0..ds.n_rows()).map(|row| ds.key_at(row, &cols)).collect()
}

/// Rows whose key tuple occurs more than once (every occurrence counts).
fn duplicate_rows(tuples: &[KeyValue]) -> usize {
    let mut counts: FxHashMap<&KeyValue, usize> = FxHashMap::default();
    for key in tuples {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.values().filter(|&&n| n > 1).sum()
}

fn log_findings(findings: &[Finding], how: JoinKind) {
    for f in findings {
        match f.severity {
            Severity::Error => log::warn!("{how} join blocked: {}", f.message),
            Severity::Warning => log::debug!("{how} join: {}", f.message),
        }
    }
}
