//! CSV loading.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use super::infer::{infer_column, InferenceOptions};
use super::table::Table;
use super::{DatasetError, DatasetResult};

/// Load a dataset from a CSV file on disk.
pub fn load_path(path: impl AsRef<Path>, options: InferenceOptions) -> DatasetResult<Table> {
    let file = std::fs::File::open(path.as_ref())?;
    load_reader(file, options)
}

/// Load a dataset from CSV text.
pub fn load_str(content: &str, options: InferenceOptions) -> DatasetResult<Table> {
    load_reader(content.as_bytes(), options)
}

/// Load a dataset from any CSV byte stream. The first record is the header.
pub fn load_reader<R: Read>(reader: R, options: InferenceOptions) -> DatasetResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = normalize_headers(reader.headers()?.iter());
    if headers.is_empty() {
        return Err(DatasetError::MissingHeader);
    }

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            warn!(
                row = index + 1,
                fields = record.len(),
                expected = headers.len(),
                "ignoring extra CSV fields"
            );
        }
        for (col, cells) in raw_columns.iter_mut().enumerate() {
            cells.push(record.get(col).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(raw_columns.iter())
        .map(|(name, cells)| infer_column(name.clone(), cells, options))
        .collect();

    let table = Table::new(columns)?;
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "loaded CSV dataset"
    );
    Ok(table)
}

/// Trim headers, name blank ones `Unnamed: <i>`, and suffix repeats `.1`, `.2`.
fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for (index, header) in raw.enumerate() {
        let trimmed = header.trim().trim_start_matches('\u{feff}').trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{}.{}", base, count);
        }
        seen.insert(name.clone(), 0);
        headers.push(name);
    }

    headers
}
