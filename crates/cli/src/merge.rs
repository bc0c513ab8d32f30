//! `tabrecon merge`, `tabrecon concat` and `tabrecon suggest-keys`.

use std::io::Write;
use std::path::PathBuf;

use tabrecon_recon::{concat, merge, suggest_join_keys, JoinKind, KeySpec, MergeOptions, MergeResult};

use crate::export::{dataset_to_csv, write_dataset};
use crate::input::{load_config, load_pair};
use crate::CliError;

pub struct MergeArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub on: Vec<String>,
    pub left_on: Vec<String>,
    pub right_on: Vec<String>,
    pub how: Option<JoinKind>,
    pub suffixes: Option<String>,
    pub columns_left: Vec<String>,
    pub columns_right: Vec<String>,
    pub exclude_left: Vec<String>,
    pub exclude_right: Vec<String>,
    pub no_validate: bool,
    pub no_indicator: bool,
    pub indicator_column: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
}

fn non_empty(v: Vec<String>) -> Option<Vec<String>> {
    (!v.is_empty()).then_some(v)
}

/// Expand repeated and comma-separated values: `--on a,b --on c`.
pub fn split_list(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_suffixes(spec: &str) -> Result<(String, String), CliError> {
    match spec.split_once(',') {
        Some((l, r)) => Ok((l.to_string(), r.to_string())),
        None => Err(CliError::args(format!("invalid --suffixes \"{spec}\""))
            .with_hint("pass two suffixes separated by a comma, e.g. --suffixes _old,_new")),
    }
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let (left, right) = load_pair(&args.left, &args.right)?;

    let keys = KeySpec {
        on: non_empty(split_list(args.on)),
        left_on: non_empty(split_list(args.left_on)),
        right_on: non_empty(split_list(args.right_on)),
    };
    let mut opts = MergeOptions::from_config(&config.merge, keys);
    if args.no_validate {
        opts = opts.validate(false);
    }
    if args.no_indicator {
        opts = opts.indicator(false);
    }
    if let Some(how) = args.how {
        opts = opts.how(how);
    }
    if let Some(spec) = &args.suffixes {
        let (l, r) = parse_suffixes(spec)?;
        opts = opts.suffixes(l, r);
    }
    if let Some(name) = args.indicator_column {
        opts = opts.indicator_column(name);
    }
    if let Some(cols) = non_empty(split_list(args.columns_left)) {
        opts = opts.columns_left(cols);
    }
    if let Some(cols) = non_empty(split_list(args.columns_right)) {
        opts = opts.columns_right(cols);
    }
    opts = opts
        .exclude_left(split_list(args.exclude_left))
        .exclude_right(split_list(args.exclude_right));

    let result = merge(&left, &right, &opts).map_err(|e| {
        CliError::recon(&e).with_hint("use --on COL, or both --left-on COL and --right-on COL")
    })?;

    emit_result(&result, args.json, args.output.as_ref())
}

pub fn cmd_concat(left: PathBuf, right: PathBuf, json: bool, output: Option<PathBuf>) -> Result<(), CliError> {
    let (l, r) = load_pair(&left, &right)?;
    let result = concat(&l, &r);
    emit_result(&result, json, output.as_ref())
}

pub fn cmd_suggest_keys(
    left: PathBuf,
    right: PathBuf,
    max: Option<usize>,
    config: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let (l, r) = load_pair(&left, &right)?;
    let max = max.unwrap_or(config.suggest.max_candidates);
    if max == 0 {
        return Err(CliError::args("--max must be at least 1"));
    }
    let suggestions = suggest_join_keys(&l, &r, max);

    let mut stdout = std::io::stdout().lock();
    if json {
        let json_str = serde_json::to_string_pretty(&suggestions)
            .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;
        writeln!(stdout, "{json_str}").map_err(|e| CliError::io(e.to_string()))?;
    } else if suggestions.is_empty() {
        eprintln!("no shared columns with compatible types");
    } else {
        for s in &suggestions {
            writeln!(stdout, "{:.1}  {}", s.score, s.column).map_err(|e| CliError::io(e.to_string()))?;
        }
    }
    Ok(())
}

/// Dataset goes to `--output`, or to stdout as CSV unless `--json` claims
/// stdout for the whole result. The summary goes to stderr.
fn emit_result(result: &MergeResult, json: bool, output: Option<&PathBuf>) -> Result<(), CliError> {
    if result.success {
        if let Some(path) = output {
            write_dataset(&result.dataset, path)?;
            eprintln!("wrote {}", path.display());
        }
    }

    let mut stdout = std::io::stdout().lock();
    if json {
        let json_str = serde_json::to_string_pretty(result)
            .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;
        writeln!(stdout, "{json_str}").map_err(|e| CliError::io(e.to_string()))?;
    } else if result.success && output.is_none() {
        let bytes = dataset_to_csv(&result.dataset, b',')?;
        stdout.write_all(&bytes).map_err(|e| CliError::io(e.to_string()))?;
    }

    let s = &result.summary;
    for warning in s.validation_warnings() {
        eprintln!("{warning}");
    }
    if result.success {
        eprintln!(
            "{} merge: {} rows ({} matched, {} left-only, {} right-only) from {} + {}",
            s.merge_type.as_str(), s.rows_result, s.matched_rows, s.unmatched_left, s.unmatched_right, s.rows_left, s.rows_right,
        );
        for (column, n) in &s.missing_values_introduced {
            eprintln!("  {column}: {n} missing values introduced");
        }
    }

    match &result.error {
        None => Ok(()),
        Some(e) => Err(CliError::recon(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_split_on_commas() {
        let got = split_list(vec!["a, b".into(), "c".into(), ",".into()]);
        assert_eq!(got, vec!["a", "b", "c"]);
    }

    #[test]
    fn suffix_pairs() {
        assert_eq!(parse_suffixes("_x,_y").unwrap(), ("_x".to_string(), "_y".to_string()));
        assert!(parse_suffixes("_x").is_err());
    }
}
