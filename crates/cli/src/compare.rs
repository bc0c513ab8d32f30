//! `tabrecon compare`: structural, row, cell and statistics comparison.

use std::io::Write;
use std::path::PathBuf;

use tabrecon_recon::{compare_all, ComparisonReport};

use crate::exit_codes::EXIT_COMPARE_DIFFS;
use crate::input::{load_config, load_pair};
use crate::CliError;

pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub key: Vec<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub explain: bool,
    pub fail_on_diff: bool,
}

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let (left, right) = load_pair(&args.left, &args.right)?;

    let keys: Vec<&str> = args.key.iter().map(String::as_str).collect();
    let key_columns = (!keys.is_empty()).then_some(keys.as_slice());
    let report = compare_all(&left, &right, key_columns, &config);

    if !keys.is_empty() && report.rows.is_none() {
        eprintln!(
            "warning: key {} not present in both datasets; row and cell comparison skipped",
            args.key.join(", ")
        );
    }

    if let Some(ref path) = args.output {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    let mut stdout = std::io::stdout().lock();
    if args.json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;
        writeln!(stdout, "{json_str}").map_err(|e| CliError::io(e.to_string()))?;
    } else {
        for line in &report.narrative.bullet_points {
            writeln!(stdout, "- {line}").map_err(|e| CliError::io(e.to_string()))?;
        }
        if args.explain {
            writeln!(stdout, "\n{}", report.narrative.explanation).map_err(|e| CliError::io(e.to_string()))?;
        }
    }

    if args.fail_on_diff && has_differences(&report) {
        return Err(CliError {
            code: EXIT_COMPARE_DIFFS,
            message: String::new(),
            hint: None,
        });
    }
    Ok(())
}

/// Schema differences, unmatched rows, or differing rows.
fn has_differences(report: &ComparisonReport) -> bool {
    let s = &report.structure;
    let schema = !s.columns_only_left.is_empty() || !s.columns_only_right.is_empty() || !s.dtype_mismatches.is_empty();
    let rows = report
        .rows
        .as_ref()
        .is_some_and(|r| r.total_only_left + r.total_only_right + r.total_differing > 0);
    schema || rows
}
