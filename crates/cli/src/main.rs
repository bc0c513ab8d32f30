// tabrecon CLI - headless dataset comparison and merge

mod compare;
mod exit_codes;
mod export;
mod input;
mod merge;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tabrecon_recon::{JoinKind, ReconError};

use compare::CompareArgs;
use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use merge::MergeArgs;

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Compare and merge tabular datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two datasets: schema, keyed rows, cells, summary statistics
    #[command(after_help = "\
Examples:
  tabrecon compare before.json after.json
  tabrecon compare before.json after.json --key id
  tabrecon compare before.json after.json --key region --key id --json
  tabrecon compare before.json after.json --key id --fail-on-diff
  tabrecon compare before.json after.json --key id --config recon.toml --output report.json")]
    Compare {
        /// Left dataset (JSON)
        left: PathBuf,

        /// Right dataset (JSON)
        right: PathBuf,

        /// Key column for row matching. Repeatable for composite keys.
        #[arg(long, short = 'k', value_name = "COL")]
        key: Vec<String>,

        /// TOML config (tolerance, report limits)
        #[arg(long, env = "TABRECON_CONFIG")]
        config: Option<PathBuf>,

        /// Print the full report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also print the long-form explanation
        #[arg(long)]
        explain: bool,

        /// Exit 4 when schemas differ or rows are unmatched or differing
        #[arg(long)]
        fail_on_diff: bool,
    },

    /// Join two datasets on key columns
    #[command(after_help = "\
Examples:
  tabrecon merge customers.json orders.json --on id
  tabrecon merge customers.json orders.json --on id --how left -o merged.csv
  tabrecon merge a.json b.json --left-on cust_id --right-on id --how outer --json
  tabrecon merge a.json b.json --on id --columns-right total,status --suffixes _a,_b
  tabrecon merge a.json b.json --on id --no-validate --no-indicator")]
    Merge {
        /// Left dataset (JSON)
        left: PathBuf,

        /// Right dataset (JSON)
        right: PathBuf,

        /// Key column(s) shared by both sides. Repeatable; comma-separated accepted.
        #[arg(long, value_name = "COLS", conflicts_with_all = ["left_on", "right_on"])]
        on: Vec<String>,

        /// Left key column(s), paired with --right-on
        #[arg(long, value_name = "COLS")]
        left_on: Vec<String>,

        /// Right key column(s), paired with --left-on
        #[arg(long, value_name = "COLS")]
        right_on: Vec<String>,

        /// Join kind: inner, left, right, outer (default from config: inner)
        #[arg(long)]
        how: Option<JoinKind>,

        /// Suffixes for overlapping non-key columns, as LEFT,RIGHT
        #[arg(long, value_name = "L,R")]
        suffixes: Option<String>,

        /// Keep only these left columns (keys are always kept)
        #[arg(long, value_name = "COLS")]
        columns_left: Vec<String>,

        /// Keep only these right columns (keys are always kept)
        #[arg(long, value_name = "COLS")]
        columns_right: Vec<String>,

        /// Drop these left columns (keys are always kept)
        #[arg(long, value_name = "COLS")]
        exclude_left: Vec<String>,

        /// Drop these right columns (keys are always kept)
        #[arg(long, value_name = "COLS")]
        exclude_right: Vec<String>,

        /// Skip pre-flight key validation
        #[arg(long)]
        no_validate: bool,

        /// Do not add the provenance indicator column
        #[arg(long)]
        no_indicator: bool,

        /// Name of the provenance indicator column
        #[arg(long, value_name = "NAME")]
        indicator_column: Option<String>,

        /// TOML config (merge defaults)
        #[arg(long, env = "TABRECON_CONFIG")]
        config: Option<PathBuf>,

        /// Print the merge result (dataset + summary) as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the merged dataset (.csv/.tsv or .json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Append the rows of RIGHT under LEFT
    #[command(after_help = "\
Examples:
  tabrecon concat jan.json feb.json -o q1.csv
  tabrecon concat jan.json feb.json --json")]
    Concat {
        /// Left dataset (JSON)
        left: PathBuf,

        /// Right dataset (JSON)
        right: PathBuf,

        /// Print the result (dataset + summary) as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the combined dataset (.csv/.tsv or .json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Rank shared columns as join-key candidates
    #[command(after_help = "\
Examples:
  tabrecon suggest-keys customers.json orders.json
  tabrecon suggest-keys customers.json orders.json --max 3 --json")]
    SuggestKeys {
        /// Left dataset (JSON)
        left: PathBuf,

        /// Right dataset (JSON)
        right: PathBuf,

        /// Maximum number of candidates (default from config: 5)
        #[arg(long)]
        max: Option<usize>,

        /// TOML config
        #[arg(long, env = "TABRECON_CONFIG")]
        config: Option<PathBuf>,

        /// Print suggestions as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            left,
            right,
            key,
            config,
            json,
            output,
            explain,
            fail_on_diff,
        } => compare::cmd_compare(CompareArgs {
            left,
            right,
            key,
            config,
            json,
            output,
            explain,
            fail_on_diff,
        }),
        Commands::Merge {
            left,
            right,
            on,
            left_on,
            right_on,
            how,
            suffixes,
            columns_left,
            columns_right,
            exclude_left,
            exclude_right,
            no_validate,
            no_indicator,
            indicator_column,
            config,
            json,
            output,
        } => merge::cmd_merge(MergeArgs {
            left,
            right,
            on,
            left_on,
            right_on,
            how,
            suffixes,
            columns_left,
            columns_right,
            exclude_left,
            exclude_right,
            no_validate,
            no_indicator,
            indicator_column,
            config,
            json,
            output,
        }),
        Commands::Concat { left, right, json, output } => merge::cmd_concat(left, right, json, output),
        Commands::SuggestKeys {
            left,
            right,
            max,
            config,
            json,
        } => merge::cmd_suggest_keys(left, right, max, config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Failure that is neither bad input nor an engine error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Engine error with its registry exit code.
    pub fn recon(err: &ReconError) -> Self {
        Self { code: recon_exit_code(err), message: err.to_string(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::{EXIT_MERGE_RESOLUTION, EXIT_MERGE_VALIDATION};

    #[test]
    fn constructors_use_registry_codes() {
        assert_eq!(CliError::args("x").code, EXIT_USAGE);
        assert_eq!(CliError::io("x").code, EXIT_IO);
        assert_eq!(CliError::internal("x").code, EXIT_ERROR);
        assert_eq!(CliError::recon(&ReconError::Resolution("x".into())).code, EXIT_MERGE_RESOLUTION);
        assert_eq!(CliError::recon(&ReconError::Validation(Vec::new())).code, EXIT_MERGE_VALIDATION);
    }

    #[test]
    fn hint_is_attached() {
        let err = CliError::io("cannot read").with_hint("check the path");
        assert_eq!(err.hint.as_deref(), Some("check the path"));
        assert_eq!(err.message, "cannot read");
    }
}
