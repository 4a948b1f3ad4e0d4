//! The question-answering pipeline.
//!
//! [`Analyst::ask`] ties everything together: it routes dataset questions to
//! the profiler, otherwise asks the plan oracle for a plan, checks it,
//! executes it, and asks the explanation oracle to put the result in words.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::compress::{compress, DEFAULT_MAX_ROWS};
use crate::config::Settings;
use crate::dataset::{profile, Dataset};
use crate::execution::{execute, ChartSpec, ExecutionError};
use crate::oracle::{ChatClient, ExplainOracle, ExplainRequest, OracleError, OracleResult, PlanOracle};
use crate::plan::{self, is_dataset_info_question, AnalysisPlan, PlanError};

/// Insight returned when a plan produces no rows.
pub const EMPTY_RESULT_INSIGHT: &str = "No meaningful results were found for this question.";

/// Default timeout for a single oracle call.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Result type for the pipeline.
pub type AnalystResult<T> = Result<T, AnalystError>;

/// Any failure that ends a request.
#[derive(Debug, thiserror::Error)]
pub enum AnalystError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// What a request returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalystResponse {
    /// The question asked about the dataset itself.
    DatasetInfo {
        table: Vec<Map<String, Value>>,
        insight: String,
    },
    /// The question was answered by running a plan.
    Analysis {
        plan: AnalysisPlan,
        results: Vec<Map<String, Value>>,
        chart: Option<ChartSpec>,
        insight: String,
    },
}

impl AnalystResponse {
    pub fn insight(&self) -> &str {
        match self {
            AnalystResponse::DatasetInfo { insight, .. }
            | AnalystResponse::Analysis { insight, .. } => insight,
        }
    }

    pub fn plan(&self) -> Option<&AnalysisPlan> {
        match self {
            AnalystResponse::Analysis { plan, .. } => Some(plan),
            AnalystResponse::DatasetInfo { .. } => None,
        }
    }

    /// The tabular part of the response as records.
    pub fn rows(&self) -> &[Map<String, Value>] {
        match self {
            AnalystResponse::DatasetInfo { table, .. } => table,
            AnalystResponse::Analysis { results, .. } => results,
        }
    }
}

/// Options for [`Analyst`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalystOptions {
    /// Timeout applied to each oracle call.
    pub timeout: Duration,
    /// Row bound for results handed to the explainer.
    pub max_rows: usize,
}

impl Default for AnalystOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl AnalystOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: settings.oracle.timeout(),
            max_rows: settings.compress.max_rows,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// Answers questions about a dataset.
#[derive(Clone)]
pub struct Analyst {
    planner: Arc<dyn PlanOracle>,
    explainer: Arc<dyn ExplainOracle>,
    options: AnalystOptions,
}

impl Analyst {
    pub fn new(planner: Arc<dyn PlanOracle>, explainer: Arc<dyn ExplainOracle>) -> Self {
        Self {
            planner,
            explainer,
            options: AnalystOptions::default(),
        }
    }

    /// Use one chat client for both planning and explanation.
    pub fn with_client(client: ChatClient) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client)
    }

    pub fn with_options(mut self, options: AnalystOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AnalystOptions {
        &self.options
    }

    /// Answer `question` about `dataset`.
    pub async fn ask(&self, dataset: &Dataset, question: &str) -> AnalystResult<AnalystResponse> {
        let span = info_span!("ask", request_id = %Uuid::new_v4());
        self.ask_inner(dataset, question).instrument(span).await
    }

    async fn ask_inner(&self, dataset: &Dataset, question: &str) -> AnalystResult<AnalystResponse> {
        let columns = dataset.column_names();

        if is_dataset_info_question(question) {
            info!("dataset question, profiling instead of planning");
            let table = profile(dataset).records();
            let insight = self
                .with_timeout(self.explainer.describe_dataset(&columns))
                .await?;
            return Ok(AnalystResponse::DatasetInfo { table, insight });
        }

        let plan = self.plan(dataset, question).await?;
        info!(analysis_type = %plan.analysis_type(), "plan accepted");

        let output = execute(dataset, &plan)?;
        info!(rows = output.result.num_rows(), "plan executed");

        let insight = if output.result.is_empty() {
            debug!("empty result, skipping explanation");
            EMPTY_RESULT_INSIGHT.to_string()
        } else {
            let request = ExplainRequest {
                question: question.to_string(),
                results: compress(&output.result, &plan, self.options.max_rows),
                plan: plan.clone(),
                total_rows: output.result.num_rows(),
            };
            self.with_timeout(self.explainer.explain(&request)).await?
        };

        Ok(AnalystResponse::Analysis {
            results: output.result.records(),
            chart: output.chart,
            plan,
            insight,
        })
    }

    /// Ask the plan oracle for a plan and check it against the dataset.
    pub async fn plan(&self, dataset: &Dataset, question: &str) -> AnalystResult<AnalysisPlan> {
        let columns = dataset.column_names();
        let text = self
            .with_timeout(self.planner.generate_plan(&columns, question))
            .await?;
        debug!(chars = text.len(), "received plan text");
        Ok(plan::prepare(&text, &columns, question)?)
    }

    async fn with_timeout<T>(&self, call: impl Future<Output = OracleResult<T>>) -> OracleResult<T> {
        tokio::time::timeout(self.options.timeout, call)
            .await
            .map_err(|_| OracleError::Timeout(self.options.timeout))?
    }
}
