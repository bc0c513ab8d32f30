//! Loading datasets and config from disk.

use std::path::Path;

use tabrecon_core::Dataset;
use tabrecon_recon::ReconConfig;

use crate::exit_codes::EXIT_INVALID_CONFIG;
use crate::CliError;

/// Read a dataset JSON file: `{"columns":[{"name":…,"dtype":…,"values":[…]}]}`.
pub fn load_dataset(path: &Path) -> Result<Dataset, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
    let ds: Dataset = serde_json::from_str(&text).map_err(|e| {
        CliError::io(format!("{}: invalid dataset: {e}", path.display()))
            .with_hint("expected {\"columns\":[{\"name\":…,\"dtype\":…,\"values\":[…]}]}")
    })?;
    log::debug!("loaded {}: {} rows x {} columns", path.display(), ds.n_rows(), ds.n_cols());
    Ok(ds)
}

pub fn load_pair(left: &Path, right: &Path) -> Result<(Dataset, Dataset), CliError> {
    Ok((load_dataset(left)?, load_dataset(right)?))
}

/// Config from `--config`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: format!("{}: {e}", path.display()),
        hint: None,
    })
}
