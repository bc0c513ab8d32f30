use serde::Serialize;
use tabrecon_core::{Column, Dataset};

/// A ranked join-key candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySuggestion {
    pub column: String,
    pub score: f64,
}

const BASE_SCORE: f64 = 1.0;
const NAME_BONUS: f64 = 0.5;
const UNIQUE_BONUS: f64 = 0.3;

/// Rank columns shared by name (with compatible types) as join keys.
///
/// Advisory only. Ties keep the left dataset's column order.
pub fn suggest_join_keys(left: &Dataset, right: &Dataset, max_candidates: usize) -> Vec<KeySuggestion> {
    let mut candidates: Vec<KeySuggestion> = left
        .columns()
        .iter()
        .filter_map(|lc| {
            let rc = right.column(&lc.name)?;
            if !lc.dtype.is_compatible_with(rc.dtype) {
                return None;
            }
            let mut score = BASE_SCORE;
            if key_like_name(&lc.name) {
                score += NAME_BONUS;
            }
            if is_natural_key(lc, left.n_rows()) && is_natural_key(rc, right.n_rows()) {
                score += UNIQUE_BONUS;
            }
            Some(KeySuggestion {
                column: lc.name.clone(),
                score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(max_candidates);
    log::debug!("key suggestions: {:?}", candidates);
    candidates
}

fn key_like_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("id") || lower.contains("key") || lower == "index"
}

/// Every row has a distinct non-null value.
fn is_natural_key(column: &Column, n_rows: usize) -> bool {
    column.distinct_non_null_count() == n_rows
}
