//! Column type inference and numeric coercion.
//!
//! All decisions about "is this cell a number" live here, so load-time
//! typing and filter-time coercion cannot drift apart.

use super::table::Column;
use super::value::{DataType, Value};

/// Raw tokens treated as a missing cell.
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Options controlling type inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceOptions {
    /// Fraction of non-missing cells that must parse as numbers for the
    /// column to be typed numeric. Cells that fail to parse become null.
    pub numeric_threshold: f64,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            numeric_threshold: 1.0,
        }
    }
}

/// Whether a raw cell counts as missing.
pub fn is_missing(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Infer a typed column from raw text cells.
pub fn infer_column(name: impl Into<String>, raw: &[String], options: InferenceOptions) -> Column {
    let cells: Vec<Option<&str>> = raw
        .iter()
        .map(|s| {
            let trimmed = s.trim();
            (!is_missing(trimmed)).then_some(trimmed)
        })
        .collect();

    let present: Vec<&str> = cells.iter().flatten().copied().collect();
    if present.is_empty() {
        return Column::new(name, DataType::Empty, vec![Value::Null; raw.len()]);
    }

    if present.iter().all(|s| parse_bool(s).is_some()) {
        let values = cells
            .iter()
            .map(|c| c.and_then(parse_bool).map(Value::Bool).unwrap_or(Value::Null))
            .collect();
        return Column::new(name, DataType::Boolean, values);
    }

    let meets_threshold =
        |parsed: usize| parsed as f64 >= options.numeric_threshold * present.len() as f64;

    // Integer only when no present cell is a non-integral number.
    let ints = present.iter().filter(|s| s.parse::<i64>().is_ok()).count();
    let floats = present.iter().filter(|s| parse_float(s).is_some()).count();
    if ints == floats && meets_threshold(ints) {
        let values = cells
            .iter()
            .map(|c| {
                c.and_then(|s| s.parse::<i64>().ok())
                    .map(Value::Int)
                    .unwrap_or(Value::Null)
            })
            .collect();
        return Column::new(name, DataType::Integer, values);
    }

    if meets_threshold(floats) {
        let values = cells
            .iter()
            .map(|c| c.and_then(parse_float).map(Value::Float).unwrap_or(Value::Null))
            .collect();
        return Column::new(name, DataType::Float, values);
    }

    let values = cells
        .iter()
        .map(|c| c.map(Value::text).unwrap_or(Value::Null))
        .collect();
    Column::new(name, DataType::Text, values)
}

/// Coerce a cell to a number for comparison filters.
///
/// The cell is stringified, `%` signs and surrounding whitespace are removed,
/// then it is parsed. Anything that does not parse becomes null.
pub fn coerce_numeric(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Int(_) | Value::Float(_) => value.clone(),
        other => {
            let text = other.to_string().replace('%', "");
            parse_float(text.trim())
                .map(Value::Float)
                .unwrap_or(Value::Null)
        }
    }
}

/// Coerce a whole column, returning a float column.
pub fn coerce_numeric_column(column: &Column) -> Column {
    if column.data_type.is_numeric() {
        return column.clone();
    }
    let values: Vec<Value> = column.values.iter().map(coerce_numeric).collect();
    let data_type = if values.iter().all(Value::is_null) {
        DataType::Empty
    } else {
        DataType::Float
    };
    Column::new(column.name.clone(), data_type, values)
}
