use std::collections::{BTreeMap, HashSet};

use tabrecon_core::{Column, Dataset, SemanticType, Value};

use crate::config::MergeConfig;
use crate::error::ReconError;
use crate::index::JoinIndex;
use crate::model::{
    Finding, JoinKind, MergeResult, MergeSummary, MergeType, Provenance, ResolvedKeys, Side,
};
use crate::validate::validate_join;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Join key specification: a shared `on` list, or `left_on` + `right_on`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpec {
    pub on: Option<Vec<String>>,
    pub left_on: Option<Vec<String>>,
    pub right_on: Option<Vec<String>>,
}

impl KeySpec {
    pub fn on<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            on: Some(keys.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn split<S: Into<String>>(left_on: impl IntoIterator<Item = S>, right_on: impl IntoIterator<Item = S>) -> Self {
        Self {
            on: None,
            left_on: Some(left_on.into_iter().map(Into::into).collect()),
            right_on: Some(right_on.into_iter().map(Into::into).collect()),
        }
    }

    /// `on` wins when present. Otherwise both sides are required, with the
    /// same non-zero length.
    pub fn resolve(&self) -> Result<ResolvedKeys, ReconError> {
        if let Some(on) = &self.on {
            if on.is_empty() {
                return Err(ReconError::Resolution("'on' must name at least one column".into()));
            }
            return Ok(ResolvedKeys {
                left: on.clone(),
                right: on.clone(),
            });
        }
        match (&self.left_on, &self.right_on) {
            (Some(l), Some(r)) if l.len() != r.len() => Err(ReconError::Resolution(format!(
                "left_on and right_on must have same length: {} vs {}",
                l.len(),
                r.len()
            ))),
            (Some(l), Some(_)) if l.is_empty() => Err(ReconError::Resolution(
                "left_on and right_on must name at least one column".into(),
            )),
            (Some(l), Some(r)) => Ok(ResolvedKeys {
                left: l.clone(),
                right: r.clone(),
            }),
            _ => Err(ReconError::Resolution(
                "Must specify either 'on' or both 'left_on' and 'right_on'".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    pub keys: KeySpec,
    pub how: JoinKind,
    pub suffixes: (String, String),
    /// Include lists. `None` keeps every column.
    pub columns_left: Option<Vec<String>>,
    pub columns_right: Option<Vec<String>>,
    pub exclude_left: Vec<String>,
    pub exclude_right: Vec<String>,
    pub validate: bool,
    pub indicator: bool,
    pub indicator_column: String,
}

impl MergeOptions {
    pub fn new(keys: KeySpec) -> Self {
        Self::from_config(&MergeConfig::default(), keys)
    }

    pub fn on<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self::new(KeySpec::on(keys))
    }

    pub fn split<S: Into<String>>(left_on: impl IntoIterator<Item = S>, right_on: impl IntoIterator<Item = S>) -> Self {
        Self::new(KeySpec::split(left_on, right_on))
    }

    pub fn from_config(config: &MergeConfig, keys: KeySpec) -> Self {
        Self {
            keys,
            how: config.how,
            suffixes: (config.left_suffix.clone(), config.right_suffix.clone()),
            columns_left: None,
            columns_right: None,
            exclude_left: Vec::new(),
            exclude_right: Vec::new(),
            validate: config.validate,
            indicator: config.indicator,
            indicator_column: config.indicator_column.clone(),
        }
    }

    pub fn how(mut self, how: JoinKind) -> Self {
        self.how = how;
        self
    }

    pub fn suffixes(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.suffixes = (left.into(), right.into());
        self
    }

    pub fn columns_left<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.columns_left = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    pub fn columns_right<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.columns_right = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude_left<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.exclude_left = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_right<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.exclude_right = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn indicator(mut self, indicator: bool) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn indicator_column(mut self, name: impl Into<String>) -> Self {
        self.indicator_column = name.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Key-based join of `left` and `right`.
///
/// Only key resolution returns `Err`. Validation errors and execution
/// failures come back as a `MergeResult` with `success == false` and an
/// empty dataset.
pub fn merge(left: &Dataset, right: &Dataset, opts: &MergeOptions) -> Result<MergeResult, ReconError> {
    let keys = opts.keys.resolve()?;
    let merge_type = MergeType::from(opts.how);

    let findings = if opts.validate {
        validate_join(left, right, &keys, opts.how)
    } else {
        Vec::new()
    };
    if findings.iter().any(Finding::is_error) {
        let errors: Vec<Finding> = findings.iter().filter(|f| f.is_error()).cloned().collect();
        log::info!("{} merge rejected by validation ({} errors)", opts.how, errors.len());
        return Ok(MergeResult {
            dataset: Dataset::empty(),
            summary: MergeSummary::failed(left, right, keys, merge_type, false, findings),
            success: false,
            error: Some(ReconError::Validation(errors)),
        });
    }

    match execute(left, right, &keys, opts) {
        Ok(joined) => {
            let summary = summarize(left, right, &joined, keys, merge_type, findings);
            log::info!(
                "{} merge: {} rows ({} matched, {} left-only, {} right-only)",
                opts.how,
                summary.rows_result,
                summary.matched_rows,
                summary.unmatched_left,
                summary.unmatched_right
            );
            Ok(MergeResult {
                dataset: joined.dataset,
                summary,
                success: true,
                error: None,
            })
        }
        Err(message) => {
            log::info!("{} merge failed: {message}", opts.how);
            Ok(MergeResult {
                dataset: Dataset::empty(),
                summary: MergeSummary::failed(left, right, keys, merge_type, opts.validate, Vec::new()),
                success: false,
                error: Some(ReconError::Execution(message)),
            })
        }
    }
}

/// Where an output column's values come from.
#[derive(Debug, Clone, Copy)]
enum Source {
    Left(usize),
    Right(usize),
    /// Same-name key on both sides: left value, right value on right-only rows.
    SharedKey(usize, usize),
}

#[derive(Debug)]
struct OutputColumn {
    name: String,
    source: Source,
    /// Source column name; `None` for key columns.
    owner: Option<(Side, String)>,
}

struct Joined {
    dataset: Dataset,
    provenance: Vec<Provenance>,
    columns: Vec<OutputColumn>,
    indicator: Option<String>,
}

fn execute(left: &Dataset, right: &Dataset, keys: &ResolvedKeys, opts: &MergeOptions) -> Result<Joined, String> {
    let left_key_cols = key_positions(left, &keys.left, Side::Left)?;
    let right_key_cols = key_positions(right, &keys.right, Side::Right)?;

    for (&li, &ri) in left_key_cols.iter().zip(&right_key_cols) {
        let (lc, rc) = (&left.columns()[li], &right.columns()[ri]);
        if !lc.dtype.is_join_compatible_with(rc.dtype) {
            return Err(format!(
                "You are trying to merge on {} and {} columns for key '{}' / '{}'",
                lc.dtype, rc.dtype, lc.name, rc.name
            ));
        }
    }

    let left_cols = project(left, &keys.left, opts.columns_left.as_deref(), &opts.exclude_left);
    let right_cols = project(right, &keys.right, opts.columns_right.as_deref(), &opts.exclude_right);
    let columns = output_columns(left, right, keys, &left_cols, &right_cols, &opts.suffixes)?;

    let indicator = opts.indicator.then(|| opts.indicator_column.clone());
    if let Some(name) = &indicator {
        if columns.iter().any(|c| &c.name == name) {
            return Err(format!(
                "Cannot use name of an existing column for indicator column: '{name}'"
            ));
        }
    }

    let plan = plan_rows(left, right, &left_key_cols, &right_key_cols, opts.how);

    let mut out: Vec<Column> = columns
        .iter()
        .map(|c| {
            let (dtype, values) = match c.source {
                Source::Left(i) => (left.columns()[i].dtype, gather(&plan, |l, _| l.map(|l| left.value(i, l)))),
                Source::Right(i) => (right.columns()[i].dtype, gather(&plan, |_, r| r.map(|r| right.value(i, r)))),
                Source::SharedKey(li, ri) => (
                    left.columns()[li].dtype,
                    gather(&plan, |l, r| match (l, r) {
                        (Some(l), _) => Some(left.value(li, l)),
                        (None, Some(r)) => Some(right.value(ri, r)),
                        (None, None) => None,
                    }),
                ),
            };
            Column::new(c.name.clone(), dtype, values)
        })
        .collect();

    let provenance: Vec<Provenance> = plan
        .iter()
        .map(|pair| match pair {
            (Some(_), Some(_)) => Provenance::Both,
            (Some(_), None) => Provenance::LeftOnly,
            _ => Provenance::RightOnly,
        })
        .collect();

    if let Some(name) = &indicator {
        let values = provenance.iter().map(|p| Value::from(p.as_str())).collect();
        out.push(Column::new(name.clone(), SemanticType::Categorical, values));
    }

    let dataset = Dataset::new(out).map_err(|e| e.to_string())?;
    Ok(Joined {
        dataset,
        provenance,
        columns,
        indicator,
    })
}

fn key_positions(ds: &Dataset, keys: &[String], side: Side) -> Result<Vec<usize>, String> {
    keys.iter()
        .map(|k| {
            ds.column_index(k)
                .ok_or_else(|| format!("Key '{k}' not found in {side} dataset"))
        })
        .collect()
}

/// Column indices kept for one side: exclude first, then the include list
/// (in its order). Key columns are always kept; keys missing from an
/// include list are prepended in key order.
fn project(ds: &Dataset, keys: &[String], include: Option<&[String]>, exclude: &[String]) -> Vec<usize> {
    let is_key = |name: &str| keys.iter().any(|k| k == name);
    let kept: Vec<usize> = ds
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| is_key(&c.name) || !exclude.contains(&c.name))
        .map(|(i, _)| i)
        .collect();

    let Some(include) = include.filter(|cols| !cols.is_empty()) else {
        return kept;
    };

    let mut selected: Vec<usize> = Vec::new();
    for name in include {
        if let Some(i) = ds.column_index(name) {
            if kept.contains(&i) && !selected.contains(&i) {
                selected.push(i);
            }
        }
    }
    let missing_keys: Vec<usize> = keys
        .iter()
        .filter_map(|k| ds.column_index(k))
        .filter(|i| !selected.contains(i))
        .collect();
    missing_keys.into_iter().chain(selected).collect()
}

fn output_columns(
    left: &Dataset,
    right: &Dataset,
    keys: &ResolvedKeys,
    left_cols: &[usize],
    right_cols: &[usize],
    suffixes: &(String, String),
) -> Result<Vec<OutputColumn>, String> {
    let shared: Vec<&str> = keys.pairs().filter(|(l, r)| l == r).map(|(l, _)| l).collect();
    let left_names: HashSet<&str> = left_cols.iter().map(|&i| left.columns()[i].name.as_str()).collect();
    let right_names: HashSet<&str> = right_cols
        .iter()
        .map(|&i| right.columns()[i].name.as_str())
        .filter(|n| !shared.contains(n))
        .collect();
    let colliding = |name: &str| !shared.contains(&name) && left_names.contains(name) && right_names.contains(name);

    let mut columns = Vec::new();
    for &i in left_cols {
        let name = &left.columns()[i].name;
        let is_key = keys.left.contains(name);
        let source = if shared.contains(&name.as_str()) {
            let ri = right
                .column_index(name)
                .ok_or_else(|| format!("Key '{name}' not found in right dataset"))?;
            Source::SharedKey(i, ri)
        } else {
            Source::Left(i)
        };
        columns.push(OutputColumn {
            name: suffixed(name, colliding(name), &suffixes.0),
            source,
            owner: (!is_key).then(|| (Side::Left, name.clone())),
        });
    }
    for &i in right_cols {
        let name = &right.columns()[i].name;
        if shared.contains(&name.as_str()) {
            continue;
        }
        let is_key = keys.right.contains(name);
        columns.push(OutputColumn {
            name: suffixed(name, colliding(name), &suffixes.1),
            source: Source::Right(i),
            owner: (!is_key).then(|| (Side::Right, name.clone())),
        });
    }

    let mut seen = HashSet::new();
    for c in &columns {
        if !seen.insert(c.name.as_str()) {
            return Err(format!("Duplicate column name '{}' in merge result", c.name));
        }
    }
    Ok(columns)
}

fn suffixed(name: &str, collides: bool, suffix: &str) -> String {
    if collides {
        format!("{name}{suffix}")
    } else {
        name.to_string()
    }
}

type RowPair = (Option<usize>, Option<usize>);

/// Output rows as (left row, right row) pairs. Keys with a null never match.
fn plan_rows(left: &Dataset, right: &Dataset, left_keys: &[usize], right_keys: &[usize], how: JoinKind) -> Vec<RowPair> {
    let mut plan = Vec::new();

    if how == JoinKind::Right {
        let left_index = JoinIndex::build(left, left_keys);
        for r in 0..right.n_rows() {
            let matches = left_index.matches(&right.key_at(r, right_keys));
            if matches.is_empty() {
                plan.push((None, Some(r)));
            }
            plan.extend(matches.iter().map(|&l| (Some(l), Some(r))));
        }
        return plan;
    }

    let right_index = JoinIndex::build(right, right_keys);
    let mut right_matched = vec![false; right.n_rows()];
    for l in 0..left.n_rows() {
        let matches = right_index.matches(&left.key_at(l, left_keys));
        if matches.is_empty() && how.keeps_unmatched_left() {
            plan.push((Some(l), None));
        }
        for &r in matches {
            right_matched[r] = true;
            plan.push((Some(l), Some(r)));
        }
    }
    if how.keeps_unmatched_right() {
        plan.extend((0..right.n_rows()).filter(|&r| !right_matched[r]).map(|r| (None, Some(r))));
    }
    plan
}

fn gather<'a>(plan: &[RowPair], pick: impl Fn(Option<usize>, Option<usize>) -> Option<&'a Value>) -> Vec<Value> {
    plan.iter()
        .map(|&(l, r)| pick(l, r).cloned().unwrap_or(Value::Null))
        .collect()
}

fn summarize(
    left: &Dataset,
    right: &Dataset,
    joined: &Joined,
    join_keys: ResolvedKeys,
    merge_type: MergeType,
    findings: Vec<Finding>,
) -> MergeSummary {
    let count = |p: Provenance| joined.provenance.iter().filter(|&&x| x == p).count();

    let mut new_columns_added = Vec::new();
    let mut columns_from_left = Vec::new();
    let mut columns_from_right = Vec::new();
    let mut missing_values_introduced = BTreeMap::new();

    for (oc, col) in joined.columns.iter().zip(joined.dataset.columns()) {
        match oc.source {
            Source::Left(_) => columns_from_left.push(oc.name.clone()),
            Source::Right(_) => columns_from_right.push(oc.name.clone()),
            Source::SharedKey(..) => {
                columns_from_left.push(oc.name.clone());
                columns_from_right.push(oc.name.clone());
            }
        }
        if !left.has_column(&oc.name) && !right.has_column(&oc.name) {
            new_columns_added.push(oc.name.clone());
        }
        if let Some((side, source)) = &oc.owner {
            let owner = match side {
                Side::Left => left.column(source),
                Side::Right => right.column(source),
            };
            let before = owner.map(Column::null_count).unwrap_or(0);
            let introduced = col.null_count().saturating_sub(before);
            if introduced > 0 {
                missing_values_introduced.insert(oc.name.clone(), introduced);
            }
        }
    }
    if let Some(name) = &joined.indicator {
        new_columns_added.push(name.clone());
    }
    new_columns_added.sort();
    columns_from_left.sort();
    columns_from_right.sort();

    MergeSummary {
        rows_left: left.n_rows(),
        rows_right: right.n_rows(),
        rows_result: joined.dataset.n_rows(),
        matched_rows: count(Provenance::Both),
        unmatched_left: count(Provenance::LeftOnly),
        unmatched_right: count(Provenance::RightOnly),
        new_columns_added,
        columns_from_left,
        columns_from_right,
        missing_values_introduced,
        join_keys,
        merge_type,
        validation_passed: true,
        findings,
    }
}

// ---------------------------------------------------------------------------
// Concat
// ---------------------------------------------------------------------------

/// Row-wise append of `right` under `left`. Columns are the union; each row
/// is attributed to the side it came from.
pub fn concat(left: &Dataset, right: &Dataset) -> MergeResult {
    let no_keys = ResolvedKeys {
        left: Vec::new(),
        right: Vec::new(),
    };

    let dataset = match left.concat_rows(right) {
        Ok(ds) => ds,
        Err(e) => {
            log::info!("concat failed: {e}");
            return MergeResult {
                dataset: Dataset::empty(),
                summary: MergeSummary::failed(left, right, no_keys, MergeType::Concat, true, Vec::new()),
                success: false,
                error: Some(ReconError::Execution(e.to_string())),
            };
        }
    };

    let mut missing_values_introduced = BTreeMap::new();
    for col in dataset.columns() {
        let before: usize = [left.column(&col.name), right.column(&col.name)]
            .into_iter()
            .flatten()
            .map(Column::null_count)
            .sum();
        let introduced = col.null_count().saturating_sub(before);
        if introduced > 0 {
            missing_values_introduced.insert(col.name.clone(), introduced);
        }
    }

    let sorted_names = |ds: &Dataset| {
        let mut names: Vec<String> = ds.column_names().into_iter().map(String::from).collect();
        names.sort();
        names
    };

    log::info!("concat: {} + {} rows", left.n_rows(), right.n_rows());
    MergeResult {
        summary: MergeSummary {
            rows_left: left.n_rows(),
            rows_right: right.n_rows(),
            rows_result: dataset.n_rows(),
            matched_rows: 0,
            unmatched_left: left.n_rows(),
            unmatched_right: right.n_rows(),
            new_columns_added: Vec::new(),
            columns_from_left: sorted_names(left),
            columns_from_right: sorted_names(right),
            missing_values_introduced,
            join_keys: no_keys,
            merge_type: MergeType::Concat,
            validation_passed: true,
            findings: Vec::new(),
        },
        dataset,
        success: true,
        error: None,
    }
}
