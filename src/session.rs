//! Caller-side record of answered questions.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::analyst::AnalystResponse;
use crate::plan::AnalysisPlan;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub question: String,
    pub plan: Option<AnalysisPlan>,
    pub result: Vec<Map<String, Value>>,
    pub insight: String,
}

impl HistoryEntry {
    pub fn from_response(question: impl Into<String>, response: &AnalystResponse) -> Self {
        Self {
            question: question.into(),
            plan: response.plan().cloned(),
            result: response.rows().to_vec(),
            insight: response.insight().to_string(),
        }
    }
}

/// Append-only history of a session, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question: impl Into<String>, response: &AnalystResponse) {
        self.entries
            .push(HistoryEntry::from_response(question, response));
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
