use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabrecon_core::{Dataset, RowKey, SemanticType, Value};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DtypeMismatch {
    pub column: String,
    pub left_type: SemanticType,
    pub right_type: SemanticType,
}

/// Schema-level diff. `columns_common`, `columns_only_left` and
/// `columns_only_right` partition the union of both column sets; each list
/// is sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureReport {
    pub columns_only_left: Vec<String>,
    pub columns_only_right: Vec<String>,
    pub columns_common: Vec<String>,
    pub dtype_mismatches: Vec<DtypeMismatch>,
    pub rows_left: usize,
    pub rows_right: usize,
    pub cols_left: usize,
    pub cols_right: usize,
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row present on one side only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedRow {
    pub key: RowKey,
    pub row: usize,
}

/// First occurrence of a key on each side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRow {
    pub key: RowKey,
    pub left_row: usize,
    pub right_row: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowReport {
    pub key_columns: Vec<String>,
    pub only_left: Vec<KeyedRow>,
    pub only_right: Vec<KeyedRow>,
    pub in_both_same: Vec<MatchedRow>,
    pub in_both_differing: Vec<MatchedRow>,
    pub total_only_left: usize,
    pub total_only_right: usize,
    pub total_in_both: usize,
    pub total_same: usize,
    pub total_differing: usize,
}

impl RowReport {
    pub fn rows_only_left(&self, left: &Dataset) -> Dataset {
        left.take(&self.only_left.iter().map(|r| r.row).collect::<Vec<_>>())
    }

    pub fn rows_only_right(&self, right: &Dataset) -> Dataset {
        right.take(&self.only_right.iter().map(|r| r.row).collect::<Vec<_>>())
    }

    /// Left-side rows of the pairs with identical non-key values.
    pub fn rows_in_both(&self, left: &Dataset) -> Dataset {
        left.take(&self.in_both_same.iter().map(|r| r.left_row).collect::<Vec<_>>())
    }

    /// Left-side rows of the pairs with at least one differing value.
    pub fn rows_in_both_differing(&self, left: &Dataset) -> Dataset {
        left.take(&self.in_both_differing.iter().map(|r| r.left_row).collect::<Vec<_>>())
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// null -> value
    Filled,
    /// value -> null
    Nullified,
    Changed,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Filled => "filled",
            DiffKind::Nullified => "nullified",
            DiffKind::Changed => "changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDiffEntry {
    pub row_key: RowKey,
    pub column: String,
    pub old_value: Value,
    pub new_value: Value,
    pub kind: DiffKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellReport {
    pub entries: Vec<CellDiffEntry>,
    pub column_diff_counts: BTreeMap<String, usize>,
    pub total_differences: usize,
}

impl CellReport {
    /// Up to `n` columns by descending diff count, ties by name.
    pub fn most_affected(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .column_diff_counts
            .iter()
            .map(|(column, count)| (column.as_str(), *count))
            .collect();
        // BTreeMap order is by name; a stable sort keeps it for equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NullCountDelta {
    pub left: usize,
    pub right: usize,
    /// right - left
    pub delta: i64,
}

/// NaN fields when the column holds no valid values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStatsPair {
    pub left: NumericStats,
    pub right: NumericStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    Min,
    Max,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Mean, Statistic::Min, Statistic::Max];

    pub fn of(&self, stats: &NumericStats) -> f64 {
        match self {
            Statistic::Mean => stats.mean,
            Statistic::Min => stats.min,
            Statistic::Max => stats.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatDifference {
    pub column: String,
    pub statistic: Statistic,
    pub left_value: f64,
    pub right_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub null_counts: BTreeMap<String, NullCountDelta>,
    pub numeric_stats: BTreeMap<String, NumericStatsPair>,
    pub differences: Vec<StatDifference>,
}

// ---------------------------------------------------------------------------
// Comparison report
// ---------------------------------------------------------------------------

/// Presentation-only rendering of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub summary: String,
    pub bullet_points: Vec<String>,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub structure: StructureReport,
    /// Present only when a valid key was supplied.
    pub rows: Option<RowReport>,
    pub cells: Option<CellReport>,
    pub stats: StatsReport,
    pub narrative: Narrative,
}

// ---------------------------------------------------------------------------
// Merge: join kinds, findings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Outer => "outer",
        }
    }

    pub fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Outer)
    }

    pub fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::Outer)
    }
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "outer" => Ok(JoinKind::Outer),
            other => Err(format!(
                "unknown join kind \"{other}\" (expected inner, left, right or outer)"
            )),
        }
    }
}

/// What produced a merge result: a keyed join or a row-wise append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeType {
    Inner,
    Left,
    Right,
    Outer,
    Concat,
}

impl MergeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeType::Inner => "inner",
            MergeType::Left => "left",
            MergeType::Right => "right",
            MergeType::Outer => "outer",
            MergeType::Concat => "concat",
        }
    }
}

impl From<JoinKind> for MergeType {
    fn from(how: JoinKind) -> Self {
        match how {
            JoinKind::Inner => MergeType::Inner,
            JoinKind::Left => MergeType::Left,
            JoinKind::Right => MergeType::Right,
            JoinKind::Outer => MergeType::Outer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the merge.
    Error,
    /// Advisory; the merge proceeds.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingKind {
    MissingKey {
        side: Side,
        column: String,
    },
    DtypeMismatch {
        left_column: String,
        right_column: String,
        left_type: SemanticType,
        right_type: SemanticType,
    },
    DuplicateKeys {
        side: Side,
        rows: usize,
    },
    NullKeys {
        side: Side,
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Per-row provenance recorded by the indicator column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Both,
    LeftOnly,
    RightOnly,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Both => "both",
            Provenance::LeftOnly => "left_only",
            Provenance::RightOnly => "right_only",
        }
    }
}

/// Join key columns after resolving `on` / `left_on` + `right_on`.
/// Both lists have the same non-zero length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedKeys {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl ResolvedKeys {
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.left.iter().map(String::as_str).zip(self.right.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Merge: summary + result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeSummary {
    pub rows_left: usize,
    pub rows_right: usize,
    pub rows_result: usize,
    pub matched_rows: usize,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
    pub new_columns_added: Vec<String>,
    pub columns_from_left: Vec<String>,
    pub columns_from_right: Vec<String>,
    /// Nulls the join introduced, per owned non-key column. Zero entries are omitted.
    pub missing_values_introduced: BTreeMap<String, usize>,
    pub join_keys: ResolvedKeys,
    pub merge_type: MergeType,
    pub validation_passed: bool,
    pub findings: Vec<Finding>,
}

impl MergeSummary {
    /// Summary for an attempt that produced no dataset.
    pub(crate) fn failed(
        left: &Dataset,
        right: &Dataset,
        join_keys: ResolvedKeys,
        merge_type: MergeType,
        validation_passed: bool,
        findings: Vec<Finding>,
    ) -> Self {
        Self {
            rows_left: left.n_rows(),
            rows_right: right.n_rows(),
            rows_result: 0,
            matched_rows: 0,
            unmatched_left: 0,
            unmatched_right: 0,
            new_columns_added: Vec::new(),
            columns_from_left: Vec::new(),
            columns_from_right: Vec::new(),
            missing_values_introduced: BTreeMap::new(),
            join_keys,
            merge_type,
            validation_passed,
            findings,
        }
    }

    pub fn validation_warnings(&self) -> Vec<&str> {
        self.findings
            .iter()
            .filter(|f| !f.is_error())
            .map(|f| f.message.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeResult {
    /// Empty on failure.
    pub dataset: Dataset,
    pub summary: MergeSummary,
    pub success: bool,
    pub error: Option<ReconError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(counts: &[(&str, usize)]) -> CellReport {
        CellReport {
            entries: Vec::new(),
            column_diff_counts: counts.iter().map(|(c, n)| (c.to_string(), *n)).collect(),
            total_differences: counts.iter().map(|(_, n)| n).sum(),
        }
    }

    #[test]
    fn most_affected_orders_by_count_then_name() {
        let r = report(&[("b", 2), ("a", 2), ("c", 5), ("d", 1)]);
        assert_eq!(r.most_affected(3), vec![("c", 5), ("a", 2), ("b", 2)]);
    }

    #[test]
    fn join_kind_parse() {
        assert_eq!("outer".parse::<JoinKind>().unwrap(), JoinKind::Outer);
        assert!("cross".parse::<JoinKind>().is_err());
        assert!(JoinKind::Left.keeps_unmatched_left());
        assert!(!JoinKind::Left.keeps_unmatched_right());
    }
}
