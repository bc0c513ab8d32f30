//! Dataset output: CSV for spreadsheets, JSON in the dataset input shape.

use std::path::Path;

use tabrecon_core::{Dataset, Value};

use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// `.csv` / `.tsv` write CSV; anything else writes JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
            Some(ext) if ext == "csv" || ext == "tsv" => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }
}

/// Header row of column names, then one record per row. Nulls are empty cells.
pub fn dataset_to_csv(ds: &Dataset, delimiter: u8) -> Result<Vec<u8>, CliError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer
        .write_record(ds.column_names())
        .map_err(|e| CliError::io(e.to_string()))?;

    for row in 0..ds.n_rows() {
        let record: Vec<String> = (0..ds.n_cols()).map(|col| cell_text(ds.value(col, row))).collect();
        writer.write_record(&record).map_err(|e| CliError::io(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CliError::io(format!("CSV flush error: {e}")))
}

pub fn dataset_to_json(ds: &Dataset) -> Result<Vec<u8>, CliError> {
    let mut bytes = serde_json::to_vec_pretty(ds)
        .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write `ds` to `path`, format chosen by extension.
pub fn write_dataset(ds: &Dataset, path: &Path) -> Result<(), CliError> {
    let bytes = match OutputFormat::from_path(path) {
        OutputFormat::Csv => {
            let is_tsv = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
            dataset_to_csv(ds, if is_tsv { b'\t' } else { b',' })?
        }
        OutputFormat::Json => dataset_to_json(ds)?,
    };
    std::fs::write(path, bytes).map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
    log::debug!("wrote {} rows to {}", ds.n_rows(), path.display());
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabrecon_core::{Column, SemanticType};

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new("id", SemanticType::Numeric, vec![Value::Int(1), Value::Float(2.5)]),
            Column::new("name", SemanticType::Text, vec!["a, b".into(), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn csv_quotes_and_blanks_nulls() {
        let out = String::from_utf8(dataset_to_csv(&sample(), b',').unwrap()).unwrap();
        assert_eq!(out, "id,name\n1,\"a, b\"\n2.5,\n");
    }

    #[test]
    fn json_round_trips_through_dataset_shape() {
        let bytes = dataset_to_json(&sample()).unwrap();
        let back: Dataset = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Json);
    }
}
