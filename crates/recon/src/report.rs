use tabrecon_core::Dataset;

use crate::cells::diff_matched_rows;
use crate::config::{ReconConfig, ReportConfig};
use crate::model::{CellReport, ComparisonReport, Narrative, RowReport, StatsReport, StructureReport};
use crate::rows::match_rows;
use crate::stats::compare_stats;
use crate::structure::compare_structure;

/// Full comparison: structure and statistics always; rows and cells only
/// when `key_columns` is given and every key exists on both sides.
pub fn compare_all(
    left: &Dataset,
    right: &Dataset,
    key_columns: Option<&[&str]>,
    config: &ReconConfig,
) -> ComparisonReport {
    let structure = compare_structure(left, right);

    let (rows, cells) = match key_columns.filter(|k| !k.is_empty()) {
        Some(keys) => match match_rows(left, right, keys, &config.tolerance) {
            Ok(rows) => {
                let cells = diff_matched_rows(left, right, &rows, &config.tolerance);
                (Some(rows), Some(cells))
            }
            Err(e) => {
                log::debug!("row comparison skipped: {e}");
                (None, None)
            }
        },
        None => (None, None),
    };

    let stats = compare_stats(left, right, &config.tolerance);
    let narrative = build_narrative(&structure, rows.as_ref(), cells.as_ref(), &stats, &config.report);

    ComparisonReport {
        structure,
        rows,
        cells,
        stats,
        narrative,
    }
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

pub fn build_narrative(
    structure: &StructureReport,
    rows: Option<&RowReport>,
    cells: Option<&CellReport>,
    stats: &StatsReport,
    limits: &ReportConfig,
) -> Narrative {
    let mut lines = Vec::new();
    let s = structure;

    lines.push(format!(
        "Left has {} rows, {} columns; Right has {} rows, {} columns.",
        s.rows_left, s.cols_left, s.rows_right, s.cols_right
    ));
    if !s.columns_only_left.is_empty() {
        lines.push(format!(
            "Columns only in left: {}",
            elided_list(&s.columns_only_left, limits.list_columns)
        ));
    }
    if !s.columns_only_right.is_empty() {
        lines.push(format!(
            "Columns only in right: {}",
            elided_list(&s.columns_only_right, limits.list_columns)
        ));
    }
    if !s.dtype_mismatches.is_empty() {
        let listed: Vec<String> = s
            .dtype_mismatches
            .iter()
            .take(limits.list_mismatches)
            .map(|m| format!("{} ({} vs {})", m.column, m.left_type, m.right_type))
            .collect();
        lines.push(format!(
            "Dtype mismatches in {} columns: {}",
            s.dtype_mismatches.len(),
            listed.join(", ")
        ));
    }

    if let Some(r) = rows {
        lines.push(format!(
            "Row comparison: {} only in left, {} only in right, {} in both ({} differing).",
            r.total_only_left, r.total_only_right, r.total_in_both, r.total_differing
        ));
    }
    if let Some(c) = cells.filter(|c| c.total_differences > 0) {
        let top: Vec<String> = c
            .most_affected(limits.top_columns)
            .into_iter()
            .map(|(col, n)| format!("{col}({n})"))
            .collect();
        lines.push(format!(
            "Cell-level differences: {} total. Most affected columns: {}",
            c.total_differences,
            top.join(", ")
        ));
    }

    if !stats.differences.is_empty() {
        lines.push(format!(
            "Summary stats differ in {} column/stat pairs.",
            stats.differences.len()
        ));
    }

    Narrative {
        summary: lines.join(" "),
        explanation: explain(structure, rows, cells, limits),
        bullet_points: lines,
    }
}

fn elided_list(items: &[String], limit: usize) -> String {
    let shown: Vec<&str> = items.iter().take(limit).map(String::as_str).collect();
    let mut out = shown.join(", ");
    if items.len() > limit {
        out.push_str(" ...");
    }
    out
}

/// Long-form plain-English paragraph.
fn explain(
    s: &StructureReport,
    rows: Option<&RowReport>,
    cells: Option<&CellReport>,
    limits: &ReportConfig,
) -> String {
    let mut parts = vec![format!(
        "The left dataset has {} rows and {} columns. The right dataset has {} rows and {} columns.",
        s.rows_left, s.cols_left, s.rows_right, s.cols_right
    )];

    if !s.columns_only_left.is_empty() {
        parts.push(format!(
            "The left dataset has {} column(s) not in the right: {}.",
            s.columns_only_left.len(),
            s.columns_only_left.join(", ")
        ));
    }
    if !s.columns_only_right.is_empty() {
        parts.push(format!(
            "The right dataset has {} column(s) not in the left: {}.",
            s.columns_only_right.len(),
            s.columns_only_right.join(", ")
        ));
    }
    if !s.dtype_mismatches.is_empty() {
        parts.push(format!(
            "There are {} column(s) with different data types between the two datasets.",
            s.dtype_mismatches.len()
        ));
    }

    if let Some(r) = rows {
        parts.push(format!(
            "Using the key column(s) {}: {} row(s) appear only in the left, {} only in the right, \
             and {} appear in both. Of those in both, {} have different values in at least one column.",
            r.key_columns.join(", "),
            r.total_only_left,
            r.total_only_right,
            r.total_in_both,
            r.total_differing
        ));
    }

    if let Some(c) = cells.filter(|c| c.total_differences > 0) {
        let top: Vec<String> = c
            .most_affected(limits.top_columns)
            .into_iter()
            .map(|(col, n)| format!("{col} ({n} changes)"))
            .collect();
        parts.push(format!(
            "There are {} cell-level differences. The columns with the most changes are: {}.",
            c.total_differences,
            top.join(", ")
        ));
    }

    parts.join(" ")
}
