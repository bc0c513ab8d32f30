//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                        |
//! |------|-----------|----------------------------------------------------|
//! | 0    | Universal | Success                                            |
//! | 1    | Universal | General error (unspecified)                        |
//! | 2    | Universal | CLI usage error (bad args, conflicting options)    |
//! | 3    | Universal | Cannot read/write a file, or dataset JSON invalid  |
//! | 4    | compare   | Differences found (only with `--fail-on-diff`)     |
//! | 5    | merge     | Validation error blocked the merge                 |
//! | 6    | merge     | Join could not be executed                         |
//! | 7    | merge     | Key specification missing or ambiguous             |
//! | 8    | config    | Config file could not be parsed or is invalid      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use tabrecon_recon::{ErrorKind, ReconError};

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// IO error - unreadable/unwritable file or malformed dataset JSON.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Compare (4)
// =============================================================================

/// `compare --fail-on-diff` found rows or cells that differ.
/// Like `diff(1)`, a non-zero code means "datasets differ."
pub const EXIT_COMPARE_DIFFS: u8 = 4;

// =============================================================================
// Merge (5-7)
// =============================================================================

/// An ERROR-tagged validation finding blocked the merge.
pub const EXIT_MERGE_VALIDATION: u8 = 5;

/// The join itself failed (incompatible key types, name collisions).
pub const EXIT_MERGE_EXECUTION: u8 = 6;

/// Neither `--on` nor both `--left-on`/`--right-on`, or unequal lengths.
pub const EXIT_MERGE_RESOLUTION: u8 = 7;

// =============================================================================
// Config (8)
// =============================================================================

/// Config TOML failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 8;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err.kind() {
        ErrorKind::Lookup => EXIT_USAGE,
        ErrorKind::Resolution => EXIT_MERGE_RESOLUTION,
        ErrorKind::Validation => EXIT_MERGE_VALIDATION,
        ErrorKind::Execution => EXIT_MERGE_EXECUTION,
        ErrorKind::Config => EXIT_INVALID_CONFIG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_COMPARE_DIFFS,
            EXIT_MERGE_VALIDATION,
            EXIT_MERGE_EXECUTION,
            EXIT_MERGE_RESOLUTION,
            EXIT_INVALID_CONFIG,
        ];
        let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn engine_errors_map_to_codes() {
        assert_eq!(recon_exit_code(&ReconError::Resolution("x".into())), EXIT_MERGE_RESOLUTION);
        assert_eq!(recon_exit_code(&ReconError::Execution("x".into())), EXIT_MERGE_EXECUTION);
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(recon_exit_code(&ReconError::Validation(Vec::new())), EXIT_MERGE_VALIDATION);
    }
}
