//! Columnar in-memory table.

use std::fmt;

use serde_json::Map;

use super::value::{DataType, Value};
use super::{DatasetError, DatasetResult};

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column with an explicit data type.
    pub fn new(name: impl Into<String>, data_type: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            data_type,
            values,
        }
    }

    /// Create a column whose type is derived from the values it holds.
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Self {
        let data_type = DataType::of_values(&values);
        Self::new(name, data_type, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Number of distinct non-null values.
    pub fn distinct_count(&self) -> usize {
        let distinct: std::collections::BTreeSet<&Value> =
            self.values.iter().filter(|v| !v.is_null()).collect();
        distinct.len()
    }

    fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            data_type: self.data_type,
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
        }
    }
}

/// An ordered set of equally long columns.
///
/// Tables are immutable values: every transformation returns a new table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

/// The dataset a question is asked about. Same type as any intermediate table.
pub type Dataset = Table;

impl Table {
    /// Build a table, checking that column names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> DatasetResult<Self> {
        let num_rows = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = std::collections::HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != num_rows {
                return Err(DatasetError::RaggedColumn {
                    column: column.name.clone(),
                    expected: num_rows,
                    actual: column.len(),
                });
            }
        }

        Ok(Self { columns, num_rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Cell at `row` in every column, in column order.
    pub fn row(&self, row: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[row]).collect()
    }

    /// Select rows by index, in the given order.
    pub fn take(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            num_rows: rows.len(),
        }
    }

    pub fn head(&self, n: usize) -> Table {
        let rows: Vec<usize> = (0..n.min(self.num_rows)).collect();
        self.take(&rows)
    }

    pub fn tail(&self, n: usize) -> Table {
        let start = self.num_rows.saturating_sub(n);
        let rows: Vec<usize> = (start..self.num_rows).collect();
        self.take(&rows)
    }

    /// Replace the column of the same name. Lengths must match.
    pub fn with_column(mut self, column: Column) -> DatasetResult<Table> {
        let actual = column.len();
        if actual != self.num_rows {
            return Err(DatasetError::RaggedColumn {
                column: column.name,
                expected: self.num_rows,
                actual,
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => *slot = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }

    /// Whether two rows hold equal cells in every column.
    pub fn rows_equal(&self, a: usize, b: usize) -> bool {
        self.columns.iter().all(|c| c.values[a] == c.values[b])
    }

    /// One row as a JSON object in column order.
    pub fn record(&self, row: usize) -> Map<String, serde_json::Value> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.values[row].to_json()))
            .collect()
    }

    /// All rows as JSON objects.
    pub fn records(&self) -> Vec<Map<String, serde_json::Value>> {
        (0..self.num_rows).map(|r| self.record(r)).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| c.values.iter().map(|v| v.to_string()).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(c, rendered)| {
                rendered
                    .iter()
                    .map(|s| s.chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c.name, w = *w))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;

        for row in 0..self.num_rows {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(col, w)| format!("{:<w$}", col[row], w = *w))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())?;
        }
        Ok(())
    }
}
