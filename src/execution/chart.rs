//! Chart descriptors derived from the result table.

use serde::Serialize;
use tracing::{debug, warn};

use crate::dataset::Table;
use crate::plan::{AnalysisPlan, ChartType};

use super::{ExecutionError, ExecutionResult};

/// A renderable chart over the result table.
///
/// Serialized as `{"type": "bar", "x": ..., "y": ..., "color": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartSpec {
    Bar {
        x: String,
        y: String,
        color: Option<String>,
    },
    Line {
        x: String,
        y: String,
        color: Option<String>,
    },
    Scatter {
        x: String,
        y: String,
        color: Option<String>,
    },
    Histogram {
        x: String,
        color: Option<String>,
    },
}

impl ChartSpec {
    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartSpec::Bar { .. } => ChartType::Bar,
            ChartSpec::Line { .. } => ChartType::Line,
            ChartSpec::Scatter { .. } => ChartType::Scatter,
            ChartSpec::Histogram { .. } => ChartType::Histogram,
        }
    }

    pub fn x(&self) -> &str {
        match self {
            ChartSpec::Bar { x, .. }
            | ChartSpec::Line { x, .. }
            | ChartSpec::Scatter { x, .. }
            | ChartSpec::Histogram { x, .. } => x,
        }
    }

    pub fn y(&self) -> Option<&str> {
        match self {
            ChartSpec::Bar { y, .. } | ChartSpec::Line { y, .. } | ChartSpec::Scatter { y, .. } => {
                Some(y)
            }
            ChartSpec::Histogram { .. } => None,
        }
    }
}

/// Build the chart for a result, if the plan asks for one.
///
/// A missing `y` falls back to the first metric column present in the
/// result. A `y` that is not a result column is an error; a missing
/// required axis only suppresses the chart.
pub fn derive_chart(result: &Table, plan: &AnalysisPlan) -> ExecutionResult<Option<ChartSpec>> {
    let Some(viz) = plan.visualization.as_ref() else {
        return Ok(None);
    };

    let y = match (&viz.y, viz.chart_type) {
        (Some(y), _) => Some(y.clone()),
        (None, ChartType::Histogram) => None,
        (None, _) => plan
            .kind
            .aggregate()
            .map(|a| a.output_names())
            .unwrap_or_default()
            .into_iter()
            .find(|name| result.has_column(name)),
    };

    if let Some(y) = &y {
        if !result.has_column(y) {
            return Err(ExecutionError::InvalidYAxis {
                y: y.clone(),
                available: result.column_names(),
            });
        }
    }

    let Some(x) = viz.x.clone() else {
        debug!("no x-axis, skipping chart");
        return Ok(None);
    };
    if !result.has_column(&x) {
        warn!(x = %x, "x-axis is not a result column, skipping chart");
        return Ok(None);
    }

    let color = viz.color.clone().filter(|c| result.has_column(c));

    let spec = match (viz.chart_type, y) {
        (ChartType::Histogram, _) => ChartSpec::Histogram { x, color },
        (_, None) => {
            debug!("no y-axis, skipping chart");
            return Ok(None);
        }
        (ChartType::Bar, Some(y)) => ChartSpec::Bar { x, y, color },
        (ChartType::Line, Some(y)) => ChartSpec::Line { x, y, color },
        (ChartType::Scatter, Some(y)) => ChartSpec::Scatter { x, y, color },
    };

    Ok(Some(spec))
}
