//! Intent-aware reduction of result tables for the explanation oracle.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::dataset::Table;
use crate::plan::{AnalysisPlan, Focus};

/// Default bound on rows handed to the explainer.
pub const DEFAULT_MAX_ROWS: usize = 10;

/// The part of a result the explainer gets to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompactResult {
    /// Rows as JSON objects, in column order.
    Rows(Vec<Map<String, Value>>),
    /// Stringified values of the first column, for enumeration questions.
    Values(Vec<String>),
}

impl CompactResult {
    pub fn len(&self) -> usize {
        match self {
            CompactResult::Rows(rows) => rows.len(),
            CompactResult::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reduce `result` to what answers the question's focus.
pub fn compress(result: &Table, plan: &AnalysisPlan, max_rows: usize) -> CompactResult {
    match plan.user_intent.focus {
        Focus::Highest | Focus::Lowest => return CompactResult::Rows(result.head(1).records()),
        Focus::Both => {
            let mut rows = Vec::new();
            if let Some(last) = result.num_rows().checked_sub(1) {
                rows.push(result.record(0));
                if last > 0 && !result.rows_equal(0, last) {
                    rows.push(result.record(last));
                }
            }
            return CompactResult::Rows(rows);
        }
        Focus::List if !result.is_empty() => {
            if let Some(first) = result.columns().first() {
                return CompactResult::Values(first.values.iter().map(|v| v.to_string()).collect());
            }
        }
        Focus::List | Focus::General => {}
    }

    if result.num_rows() == 1 {
        return CompactResult::Rows(result.records());
    }
    CompactResult::Rows(result.head(max_rows).records())
}
