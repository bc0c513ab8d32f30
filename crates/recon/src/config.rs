use serde::Deserialize;

use crate::error::ReconError;
use crate::model::JoinKind;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine settings. Every section is optional; an empty document yields
/// the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub tolerance: Tolerance,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// Approximate equality for numeric cells and statistics:
/// `|a - b| <= absolute + relative * |b|`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1e-5,
            absolute: 1e-8,
        }
    }
}

impl Tolerance {
    /// Two NaNs are close; NaN is never close to a number. Infinities are
    /// only close to themselves.
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        if a.is_infinite() || b.is_infinite() {
            return a == b;
        }
        (a - b).abs() <= self.absolute + self.relative * b.abs()
    }
}

// ---------------------------------------------------------------------------
// Merge defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub how: JoinKind,
    pub left_suffix: String,
    pub right_suffix: String,
    pub validate: bool,
    pub indicator: bool,
    pub indicator_column: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            how: JoinKind::Inner,
            left_suffix: "_left".into(),
            right_suffix: "_right".into(),
            validate: true,
            indicator: true,
            indicator_column: "_merge".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Suggest + Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub max_candidates: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self { max_candidates: 5 }
    }
}

/// Narrative list limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Columns listed per "only in" bullet before eliding.
    pub list_columns: usize,
    /// Dtype mismatches listed.
    pub list_mismatches: usize,
    /// Most-affected columns listed.
    pub top_columns: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            list_columns: 10,
            list_mismatches: 5,
            top_columns: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let tol = &self.tolerance;
        for (name, value) in [("relative", tol.relative), ("absolute", tol.absolute)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "tolerance.{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if self.merge.left_suffix == self.merge.right_suffix {
            return Err(ReconError::ConfigValidation(format!(
                "merge suffixes must differ, both are \"{}\"",
                self.merge.left_suffix
            )));
        }

        if self.merge.indicator_column.is_empty() {
            return Err(ReconError::ConfigValidation(
                "merge.indicator_column must not be empty".into(),
            ));
        }

        if self.suggest.max_candidates == 0 {
            return Err(ReconError::ConfigValidation(
                "suggest.max_candidates must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
