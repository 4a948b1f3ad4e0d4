//! Datasets: typed in-memory tables.
//!
//! A dataset is loaded once per request, typed by [`infer`], and never
//! mutated afterwards. Every stage of execution produces a new [`Table`].
//!
//! ```text
//! CSV bytes ──► loader ──► infer (per column) ──► Table
//!                                                   │
//!                                 profile ◄─────────┤
//!                                 execution ◄───────┘
//! ```

pub mod infer;
mod loader;
pub mod profile;
mod table;
mod value;

pub use infer::InferenceOptions;
pub use loader::{load_path, load_reader, load_str};
pub use profile::profile;
pub use table::{Column, Dataset, Table};
pub use value::{DataType, Value};

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised while loading or assembling a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no header row")]
    MissingHeader,

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column '{column}' has {actual} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
}
