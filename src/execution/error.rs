//! Execution error types.

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::plan::MetricOp;

/// Result type for plan execution.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Errors raised while running a validated plan against a dataset.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A column the plan needs is not in the intermediate table.
    #[error("column '{column}' not found during {stage}")]
    MissingColumn { column: String, stage: &'static str },

    /// A comparison filter was given a value that is not a number.
    #[error("filter on '{column}' compares against non-numeric value {value}")]
    NonNumericFilterValue { column: String, value: String },

    /// A numeric metric was requested on a non-numeric column.
    #[error("cannot compute {operation} of non-numeric column '{column}'")]
    NonNumericAggregate { column: String, operation: MetricOp },

    /// The chart's y-axis is not a column of the result.
    #[error("invalid y-axis '{y}', available columns: {}", available.join(", "))]
    InvalidYAxis { y: String, available: Vec<String> },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl ExecutionError {
    pub(crate) fn missing(column: impl Into<String>, stage: &'static str) -> Self {
        Self::MissingColumn {
            column: column.into(),
            stage,
        }
    }
}
