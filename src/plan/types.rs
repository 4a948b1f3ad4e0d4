//! Typed analysis plan.
//!
//! A plan only takes this shape after it has passed
//! [`validate`](super::validate::validate). Raw plans from the generator are
//! plain JSON until then.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::dataset::Value;

/// Chart vocabulary that must never appear as a metric operation.
pub const VISUALIZATION_TOKENS: &[&str] = &["bar", "line", "scatter", "histogram"];

/// Filter values the generator emits when it has no real value in mind.
pub const PLACEHOLDER_VALUES: &[&str] = &["string", "number", "value", "list"];

/// The kind of analysis requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Comparison,
    Trend,
    Aggregation,
    Correlation,
    Distribution,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 5] = [
        AnalysisType::Comparison,
        AnalysisType::Trend,
        AnalysisType::Aggregation,
        AnalysisType::Correlation,
        AnalysisType::Distribution,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Comparison => "comparison",
            AnalysisType::Trend => "trend",
            AnalysisType::Aggregation => "aggregation",
            AnalysisType::Correlation => "correlation",
            AnalysisType::Distribution => "distribution",
        }
    }

    /// Whether plans of this type may carry `group_by` and `metrics`.
    pub fn aggregates(&self) -> bool {
        !matches!(self, AnalysisType::Correlation | AnalysisType::Distribution)
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "in")]
    In,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            ">=" => Some(Operator::Ge),
            "<=" => Some(Operator::Le),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::In => "in",
        }
    }

    /// Operators that coerce their column to numbers before comparing.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(Value),
    List(Vec<Value>),
}

impl FilterValue {
    /// Convert a JSON value. Nested arrays and objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Option<Vec<_>>>()
                .map(FilterValue::List),
            other => Value::from_json(other).map(FilterValue::Scalar),
        }
    }

    /// Decode a text value that holds a serialized list, e.g. `"['USA', 'UK']"`.
    ///
    /// Anything else, including text that only looks like a list, is
    /// returned unchanged.
    pub fn decode_stringified_list(self) -> Self {
        let decoded = match &self {
            FilterValue::Scalar(Value::Text(text)) => decode_list_text(text),
            _ => None,
        };
        decoded.unwrap_or(self)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FilterValue::List(_))
    }

    /// Values to test membership against; a scalar becomes a one-element list.
    pub fn as_candidates(&self) -> Vec<Value> {
        match self {
            FilterValue::Scalar(v) => vec![v.clone()],
            FilterValue::List(items) => items.clone(),
        }
    }
}

fn decode_list_text(text: &str) -> Option<FilterValue> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return None;
    }
    let parsed: serde_json::Value = serde_json::from_str(&trimmed.replace('\'', "\"")).ok()?;
    match parsed {
        serde_json::Value::Array(_) => FilterValue::from_json(&parsed),
        _ => None,
    }
}

/// A single row filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub column: String,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(column: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }
}

/// Statistical operation applied by a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricOp {
    Sum,
    Mean,
    Count,
    Min,
    Max,
    Median,
    Std,
}

impl MetricOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sum" => Some(MetricOp::Sum),
            "mean" => Some(MetricOp::Mean),
            "count" => Some(MetricOp::Count),
            "min" => Some(MetricOp::Min),
            "max" => Some(MetricOp::Max),
            "median" => Some(MetricOp::Median),
            "std" => Some(MetricOp::Std),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricOp::Sum => "sum",
            MetricOp::Mean => "mean",
            MetricOp::Count => "count",
            MetricOp::Min => "min",
            MetricOp::Max => "max",
            MetricOp::Median => "median",
            MetricOp::Std => "std",
        }
    }

    /// Operations that only make sense over numbers.
    pub fn requires_numeric(&self) -> bool {
        matches!(
            self,
            MetricOp::Sum | MetricOp::Mean | MetricOp::Median | MetricOp::Std
        )
    }
}

impl fmt::Display for MetricOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub column: String,
    pub operation: MetricOp,
}

impl Metric {
    pub fn new(column: impl Into<String>, operation: MetricOp) -> Self {
        Self {
            column: column.into(),
            operation,
        }
    }
}

/// Grouping and metrics carried by aggregating analysis types.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregate {
    pub group_by: Vec<String>,
    pub metrics: Vec<Metric>,
}

impl Aggregate {
    /// Result column name for each metric, in order.
    ///
    /// The first metric on a column keeps the column's name; later metrics on
    /// the same column are suffixed with their operation (`Sales_max`).
    pub fn output_names(&self) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        self.metrics
            .iter()
            .map(|m| {
                let count = seen.entry(m.column.as_str()).or_insert(0);
                *count += 1;
                if *count == 1 {
                    m.column.clone()
                } else {
                    format!("{}_{}", m.column, m.operation)
                }
            })
            .collect()
    }
}

/// Analysis type with the fields that are legal for it.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisKind {
    Comparison(Aggregate),
    Trend(Aggregate),
    Aggregation(Aggregate),
    Correlation,
    Distribution,
}

impl AnalysisKind {
    /// Build the kind for `analysis_type`, discarding grouping for types that
    /// cannot carry it.
    pub fn new(analysis_type: AnalysisType, aggregate: Aggregate) -> Self {
        match analysis_type {
            AnalysisType::Comparison => AnalysisKind::Comparison(aggregate),
            AnalysisType::Trend => AnalysisKind::Trend(aggregate),
            AnalysisType::Aggregation => AnalysisKind::Aggregation(aggregate),
            AnalysisType::Correlation => AnalysisKind::Correlation,
            AnalysisType::Distribution => AnalysisKind::Distribution,
        }
    }

    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisKind::Comparison(_) => AnalysisType::Comparison,
            AnalysisKind::Trend(_) => AnalysisType::Trend,
            AnalysisKind::Aggregation(_) => AnalysisType::Aggregation,
            AnalysisKind::Correlation => AnalysisType::Correlation,
            AnalysisKind::Distribution => AnalysisType::Distribution,
        }
    }

    pub fn aggregate(&self) -> Option<&Aggregate> {
        match self {
            AnalysisKind::Comparison(a) | AnalysisKind::Trend(a) | AnalysisKind::Aggregation(a) => {
                Some(a)
            }
            AnalysisKind::Correlation | AnalysisKind::Distribution => None,
        }
    }

    pub fn group_by(&self) -> &[String] {
        self.aggregate().map(|a| a.group_by.as_slice()).unwrap_or(&[])
    }

    pub fn metrics(&self) -> &[Metric] {
        self.aggregate().map(|a| a.metrics.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub by: Option<String>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Scatter,
    Histogram,
}

impl ChartType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bar" => Some(ChartType::Bar),
            "line" => Some(ChartType::Line),
            "scatter" => Some(ChartType::Scatter),
            "histogram" => Some(ChartType::Histogram),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
            ChartType::Histogram => "histogram",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visualization {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub top_n: Option<usize>,
}

impl Visualization {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            x: None,
            y: None,
            color: None,
            top_n: None,
        }
    }
}

/// Which end of the result the question cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Highest,
    Lowest,
    Both,
    #[default]
    General,
    /// The question asks for an enumeration of entities.
    List,
}

impl Focus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "highest" => Some(Focus::Highest),
            "lowest" => Some(Focus::Lowest),
            "both" => Some(Focus::Both),
            "general" => Some(Focus::General),
            "list" => Some(Focus::List),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UserIntent {
    pub show_highest: bool,
    pub show_lowest: bool,
    pub focus: Focus,
}

/// A validated, executable analysis plan.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPlan {
    pub kind: AnalysisKind,
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    pub visualization: Option<Visualization>,
    pub user_intent: UserIntent,
}

impl AnalysisPlan {
    pub fn analysis_type(&self) -> AnalysisType {
        self.kind.analysis_type()
    }

    pub fn group_by(&self) -> &[String] {
        self.kind.group_by()
    }

    pub fn metrics(&self) -> &[Metric] {
        self.kind.metrics()
    }

    pub fn top_n(&self) -> Option<usize> {
        self.visualization.as_ref().and_then(|v| v.top_n)
    }
}

/// Flat wire shape of a plan, as the generator and clients see it.
#[derive(Serialize)]
struct PlanDocument<'a> {
    analysis_type: AnalysisType,
    filters: &'a [Filter],
    group_by: &'a [String],
    metrics: &'a [Metric],
    sort: Option<&'a Sort>,
    visualization: Option<&'a Visualization>,
    user_intent: &'a UserIntent,
}

impl Serialize for AnalysisPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PlanDocument {
            analysis_type: self.analysis_type(),
            filters: &self.filters,
            group_by: self.group_by(),
            metrics: self.metrics(),
            sort: self.sort.as_ref(),
            visualization: self.visualization.as_ref(),
            user_intent: &self.user_intent,
        }
        .serialize(serializer)
    }
}
