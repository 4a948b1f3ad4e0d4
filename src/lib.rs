//! # askdata
//!
//! Answers natural-language questions about a tabular dataset by turning them
//! into validated, executable analysis plans.
//!
//! ## Architecture
//!
//! A language model proposes a plan; everything after that is deterministic
//! and checked:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Question + Dataset (CSV)                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [oracle: PlanOracle]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Candidate plan text                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [plan: repair → sanitize → validate]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 AnalysisPlan (typed)                     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [execution]
//! ┌─────────────────────────────────────────────────────────┐
//! │            Result table + chart + filtered table         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compress → oracle: ExplainOracle]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Insight text                         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`analyst::Analyst`] runs the whole pipeline; each stage is also usable
//! on its own.

pub mod analyst;
pub mod compress;
pub mod config;
pub mod dataset;
pub mod execution;
pub mod oracle;
pub mod plan;
pub mod session;

#[cfg(feature = "server")]
pub mod web;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analyst::{Analyst, AnalystError, AnalystOptions, AnalystResponse};
    pub use crate::compress::{compress, CompactResult};
    pub use crate::config::Settings;
    pub use crate::dataset::{load_path, load_str, profile, Dataset, InferenceOptions, Table, Value};
    pub use crate::execution::{execute, ChartSpec, ExecutionOutput};
    pub use crate::oracle::{ChatClient, ExplainOracle, ExplainRequest, PlanOracle};
    pub use crate::plan::{prepare, sanitize, validate, AnalysisPlan};
    pub use crate::session::History;
}
