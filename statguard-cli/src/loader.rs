//! CSV reading and writing.
//!
//! Every CSV file must have a header row. Empty cells become
//! [`Value::Missing`], cells that parse as a float become
//! [`Value::Number`] and everything else is kept as text.

use std::path::Path;

use statguard_core::dataset::{Dataset, Value};
use statguard_core::{Result, StatguardError};
use tracing::{debug, info};

/// Interprets one CSV cell.
pub fn parse_field(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(number) => Value::Number(number),
        Err(_) => Value::Text(field.to_string()),
    }
}

/// Parses CSV content into a dataset.
///
/// # Errors
/// Returns a structural error for unreadable CSV, ragged rows or duplicate
/// header names.
pub fn read_dataset(content: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StatguardError::structural(format!("unreadable CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            StatguardError::structural(format!("unreadable CSV record {}: {}", index + 1, e))
        })?;
        rows.push(record.iter().map(parse_field).collect());
    }

    debug!("Parsed {} columns and {} rows", headers.len(), rows.len());
    Dataset::from_rows(headers, rows)
}

/// Renders a dataset as CSV with a header row.
///
/// Missing values are written as empty cells so that reading the output back
/// yields the same values.
pub fn write_dataset(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |e: csv::Error| StatguardError::structural(format!("CSV encoding failed: {}", e));

    writer
        .write_record(dataset.column_names())
        .map_err(csv_error)?;
    for index in 0..dataset.row_count() {
        let row = dataset.row(index).unwrap_or_default();
        writer
            .write_record(row.iter().map(|v| v.render().unwrap_or_default()))
            .map_err(csv_error)?;
    }

    writer.into_inner().map_err(|e| StatguardError::Io {
        context: "Failed to flush CSV output".to_string(),
        source: e.into_error(),
    })
}

/// Reads a CSV file from disk.
pub async fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = crate::output::read_file(path).await?;
    let dataset = read_dataset(&content)?;
    info!(
        "Loaded {} ({} columns, {} rows)",
        path.display(),
        dataset.column_count(),
        dataset.row_count()
    );
    Ok(dataset)
}

/// Writes a dataset to disk as CSV.
pub async fn save_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    let content = write_dataset(dataset)?;
    crate::output::write_file(path, &content).await?;
    info!("Wrote {} rows to {}", dataset.row_count(), path.display());
    Ok(())
}
