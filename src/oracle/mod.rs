//! Language-model oracles.
//!
//! The pipeline depends on two traits rather than on a concrete client, so
//! that tests and alternative backends can stand in for the HTTP endpoint.
//!
//! # Example
//!
//! ```ignore
//! use askdata::oracle::{ChatClient, PlanOracle};
//!
//! async fn example(client: &ChatClient) -> askdata::oracle::OracleResult<()> {
//!     let columns = vec!["Country".to_string(), "Sales".to_string()];
//!     let text = client.generate_plan(&columns, "total sales by country").await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod prompt;

use async_trait::async_trait;
use serde::Serialize;

use crate::compress::CompactResult;
use crate::plan::AnalysisPlan;

pub use client::ChatClient;
pub use error::{OracleError, OracleResult};

/// Turns a question into candidate plan text.
#[async_trait]
pub trait PlanOracle: Send + Sync {
    /// Produce plan text for `question` over a table with `columns`.
    ///
    /// The text is untrusted: it is repaired, sanitized and validated before use.
    async fn generate_plan(&self, columns: &[String], question: &str) -> OracleResult<String>;
}

/// Turns results into prose.
#[async_trait]
pub trait ExplainOracle: Send + Sync {
    /// Explain compressed results in answer to the original question.
    async fn explain(&self, request: &ExplainRequest) -> OracleResult<String>;

    /// Describe a dataset from its column names alone.
    async fn describe_dataset(&self, columns: &[String]) -> OracleResult<String>;
}

/// Everything the explainer is shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainRequest {
    pub question: String,
    #[serde(rename = "analysis_plan")]
    pub plan: AnalysisPlan,
    pub results: CompactResult,
    /// Rows in the full result, before compression.
    pub total_rows: usize,
}
