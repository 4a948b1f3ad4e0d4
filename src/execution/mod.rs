//! Plan execution.
//!
//! ```text
//! Dataset ─► filter ─┬─► aggregate ─► sort ─► top-n ─► result ─► chart
//!                    │
//!                    └─► filtered (kept for callers that need both extremes)
//! ```
//!
//! Execution is deterministic: the same dataset and plan always produce the
//! same tables, row order included.

mod aggregate;
mod chart;
mod error;
mod filter;

use std::cmp::Ordering;

use tracing::debug;

use crate::dataset::{Dataset, Table};
use crate::plan::{AnalysisPlan, Focus, Sort, SortOrder};

pub use aggregate::{compute, COUNT_COLUMN};
pub use chart::{derive_chart, ChartSpec};
pub use error::{ExecutionError, ExecutionResult};
pub use filter::apply_filters;

/// Everything execution produces for one plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutput {
    /// Final result table.
    pub result: Table,
    /// Chart over `result`, when the plan asks for one and its axes resolve.
    pub chart: Option<ChartSpec>,
    /// The dataset after filtering, before aggregation and truncation.
    pub filtered: Table,
}

/// Run a validated plan against a dataset.
pub fn execute(dataset: &Dataset, plan: &AnalysisPlan) -> ExecutionResult<ExecutionOutput> {
    let filtered = apply_filters(dataset, &plan.filters)?;
    debug!(
        rows = filtered.num_rows(),
        of = dataset.num_rows(),
        "filters applied"
    );

    let mut result = aggregate::aggregate(&filtered, plan.kind.aggregate())?;

    if let Some(sort) = &plan.sort {
        result = sort_table(&result, sort);
    }

    if plan.user_intent.focus != Focus::Both {
        if let Some(n) = plan.top_n() {
            result = result.head(n);
        }
    }

    let chart = derive_chart(&result, plan)?;
    debug!(
        rows = result.num_rows(),
        chart = ?chart.as_ref().map(ChartSpec::chart_type),
        "plan executed"
    );

    Ok(ExecutionOutput {
        result,
        chart,
        filtered,
    })
}

/// Stable sort by one column, nulls last in either direction.
///
/// A sort column that is not in the table leaves it unchanged.
pub fn sort_table(table: &Table, sort: &Sort) -> Table {
    let Some(column) = sort.by.as_deref().and_then(|by| table.column(by)) else {
        debug!(by = ?sort.by, "sort column not in result, skipping sort");
        return table.clone();
    };

    let mut rows: Vec<usize> = (0..table.num_rows()).collect();
    rows.sort_by(|&a, &b| {
        let (lhs, rhs) = (&column.values[a], &column.values[b]);
        match (lhs.is_null(), rhs.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match sort.order {
                SortOrder::Asc => lhs.cmp(rhs),
                SortOrder::Desc => rhs.cmp(lhs),
            },
        }
    });
    table.take(&rows)
}
