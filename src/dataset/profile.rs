//! Column-level dataset profile for "describe my dataset" questions.

use super::table::{Column, Table};
use super::value::{DataType, Value};

pub const COLUMN: &str = "Column";
pub const DATA_TYPE: &str = "Data Type";
pub const NON_NULL_COUNT: &str = "Non-Null Count";
pub const MISSING_VALUES: &str = "Missing Values";
pub const UNIQUE_VALUES: &str = "Unique Values";

/// One row per dataset column: name, type, non-null, missing and distinct counts.
///
/// Total: a dataset without columns yields an empty profile.
pub fn profile(dataset: &Table) -> Table {
    let columns = dataset.columns();

    let names = columns.iter().map(|c| Value::text(c.name.clone())).collect();
    let types = columns
        .iter()
        .map(|c| Value::text(c.data_type.name()))
        .collect();
    let non_null = columns
        .iter()
        .map(|c| Value::Int((c.len() - c.null_count()) as i64))
        .collect();
    let missing = columns
        .iter()
        .map(|c| Value::Int(c.null_count() as i64))
        .collect();
    let unique = columns
        .iter()
        .map(|c| Value::Int(c.distinct_count() as i64))
        .collect();

    let profile = vec![
        Column::new(COLUMN, DataType::Text, names),
        Column::new(DATA_TYPE, DataType::Text, types),
        Column::new(NON_NULL_COUNT, DataType::Integer, non_null),
        Column::new(MISSING_VALUES, DataType::Integer, missing),
        Column::new(UNIQUE_VALUES, DataType::Integer, unique),
    ];

    // Fixed, distinct names and one entry per source column: cannot fail.
    Table::new(profile).unwrap_or_default()
}
