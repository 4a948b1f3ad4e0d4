//! Structural and semantic validation of raw plans.
//!
//! [`validate`] is the only way to obtain an [`AnalysisPlan`]: it checks the
//! raw JSON against the dataset's columns and builds the typed plan in the
//! same pass. The first violation found is returned; there is no partial
//! acceptance.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::types::{
    Aggregate, AnalysisKind, AnalysisPlan, AnalysisType, ChartType, Filter, FilterValue, Focus,
    Metric, MetricOp, Operator, Sort, SortOrder, UserIntent, Visualization, VISUALIZATION_TOKENS,
};

/// Keys every plan must carry.
pub const REQUIRED_KEYS: [&str; 6] = [
    "analysis_type",
    "filters",
    "group_by",
    "metrics",
    "sort",
    "visualization",
];

/// Result type for plan validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A named reason for rejecting a plan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Plan must be a JSON object")]
    NotAnObject,

    #[error("Missing key: {0}")]
    MissingKey(&'static str),

    #[error("Invalid {field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    #[error("Invalid analysis_type: {0}")]
    InvalidAnalysisType(String),

    #[error("Invalid filter column: {0}")]
    UnknownFilterColumn(String),

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Operator 'in' requires a list value (column '{0}')")]
    InRequiresList(String),

    #[error("Invalid filter value for column '{0}'")]
    InvalidFilterValue(String),

    #[error("Invalid group_by column: {0}")]
    UnknownGroupByColumn(String),

    #[error("Invalid metric operation '{0}'. Only statistical operations are allowed.")]
    InvalidMetricOperation(String),

    #[error("Invalid metric column: {0}")]
    UnknownMetricColumn(String),

    #[error("{0} analysis must not contain metrics")]
    MetricsNotAllowed(AnalysisType),

    #[error("Metric result column '{0}' collides with another result column")]
    MetricNameCollision(String),

    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error("Invalid visualization type: {0}")]
    InvalidVisualizationType(String),

    #[error("Histogram must not have y-axis")]
    HistogramWithY,

    #[error("Histogram must have x-axis specified")]
    HistogramWithoutX,

    #[error("Correlation requires scatter plot")]
    CorrelationRequiresScatter,

    #[error("Correlation scatter plot must have both x and y axes")]
    CorrelationRequiresAxes,

    #[error("Invalid {axis}: {column}")]
    UnknownAxisColumn { axis: &'static str, column: String },

    #[error("top_n must be a positive integer (got {0})")]
    InvalidTopN(String),
}

/// Validate a raw plan against the dataset's columns and build the typed plan.
pub fn validate(plan: &Value, columns: &[String]) -> ValidationResult<AnalysisPlan> {
    let obj = plan.as_object().ok_or(ValidationError::NotAnObject)?;

    for key in REQUIRED_KEYS {
        if !obj.contains_key(key) {
            return Err(ValidationError::MissingKey(key));
        }
    }

    let columns: HashSet<&str> = columns.iter().map(String::as_str).collect();

    let analysis_type = obj["analysis_type"]
        .as_str()
        .and_then(AnalysisType::parse)
        .ok_or_else(|| ValidationError::InvalidAnalysisType(render(&obj["analysis_type"])))?;

    let filters = validate_filters(&obj["filters"], &columns)?;
    let group_by = validate_group_by(&obj["group_by"], &columns)?;
    let metrics = validate_metrics(&obj["metrics"], &columns)?;

    if !analysis_type.aggregates() && !metrics.is_empty() {
        return Err(ValidationError::MetricsNotAllowed(analysis_type));
    }

    let aggregate = Aggregate { group_by, metrics };
    check_result_names(&aggregate)?;

    let sort = validate_sort(&obj["sort"])?;
    let user_intent = read_user_intent(obj.get("user_intent"));
    let visualization = validate_visualization(&obj["visualization"], analysis_type, &columns)?;

    Ok(AnalysisPlan {
        kind: AnalysisKind::new(analysis_type, aggregate),
        filters,
        sort,
        visualization,
        user_intent,
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_list<'a>(value: &'a Value, field: &'static str) -> ValidationResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| ValidationError::Malformed {
        field,
        reason: format!("expected a list, got {}", value),
    })
}

fn as_entry<'a>(value: &'a Value, field: &'static str) -> ValidationResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| ValidationError::Malformed {
        field,
        reason: format!("expected an object, got {}", value),
    })
}

fn validate_filters(value: &Value, columns: &HashSet<&str>) -> ValidationResult<Vec<Filter>> {
    let mut filters = Vec::new();

    for entry in as_list(value, "filters")? {
        let entry = as_entry(entry, "filters")?;

        let column = entry.get("column").map(render).unwrap_or_default();
        if !columns.contains(column.as_str()) {
            return Err(ValidationError::UnknownFilterColumn(column));
        }

        let operator_raw = entry.get("operator").map(render).unwrap_or_default();
        let operator = Operator::parse(&operator_raw)
            .ok_or(ValidationError::InvalidOperator(operator_raw))?;

        let raw_value = entry.get("value").unwrap_or(&Value::Null);
        let mut value = FilterValue::from_json(raw_value)
            .ok_or_else(|| ValidationError::InvalidFilterValue(column.clone()))?;

        if operator == Operator::In {
            value = value.decode_stringified_list();
            if !value.is_list() {
                return Err(ValidationError::InRequiresList(column));
            }
        }

        filters.push(Filter {
            column,
            operator,
            value,
        });
    }

    Ok(filters)
}

fn validate_group_by(value: &Value, columns: &HashSet<&str>) -> ValidationResult<Vec<String>> {
    as_list(value, "group_by")?
        .iter()
        .map(|col| {
            let name = render(col);
            if columns.contains(name.as_str()) {
                Ok(name)
            } else {
                Err(ValidationError::UnknownGroupByColumn(name))
            }
        })
        .collect()
}

fn validate_metrics(value: &Value, columns: &HashSet<&str>) -> ValidationResult<Vec<Metric>> {
    let mut metrics: Vec<Metric> = Vec::new();

    for entry in as_list(value, "metrics")? {
        let entry = as_entry(entry, "metrics")?;

        let operation_raw = entry.get("operation").map(render).unwrap_or_default();
        if VISUALIZATION_TOKENS.contains(&operation_raw.as_str()) {
            continue;
        }
        let operation = MetricOp::parse(&operation_raw)
            .ok_or(ValidationError::InvalidMetricOperation(operation_raw))?;

        let column = entry.get("column").map(render).unwrap_or_default();
        if !columns.contains(column.as_str()) {
            return Err(ValidationError::UnknownMetricColumn(column));
        }

        let metric = Metric { column, operation };
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }

    Ok(metrics)
}

/// Result columns of a grouped aggregation must be unique.
fn check_result_names(aggregate: &Aggregate) -> ValidationResult<()> {
    let mut names: HashSet<String> = aggregate.group_by.iter().cloned().collect();
    for name in aggregate.output_names() {
        if !names.insert(name.clone()) {
            return Err(ValidationError::MetricNameCollision(name));
        }
    }
    Ok(())
}

/// Read an optional column-name field, treating the strings "null"/"NULL" as absent.
fn optional_name(obj: &Map<String, Value>, key: &str) -> Option<Value> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s == "null" || s == "NULL" => None,
        Some(other) => Some(other.clone()),
    }
}

fn validate_sort(value: &Value) -> ValidationResult<Option<Sort>> {
    let obj = match value {
        Value::Null => return Ok(None),
        Value::Object(obj) if obj.is_empty() => return Ok(None),
        Value::Object(obj) => obj,
        other => {
            return Err(ValidationError::Malformed {
                field: "sort",
                reason: format!("expected an object, got {}", other),
            })
        }
    };

    let by = optional_name(obj, "by").map(|v| render(&v));
    let order = match obj.get("order") {
        None | Some(Value::Null) => SortOrder::default(),
        Some(raw) => {
            let raw = render(raw);
            SortOrder::parse(&raw).ok_or(ValidationError::InvalidSortOrder(raw))?
        }
    };

    Ok(Some(Sort { by, order }))
}

fn read_user_intent(value: Option<&Value>) -> UserIntent {
    let Some(obj) = value.and_then(Value::as_object) else {
        return UserIntent::default();
    };
    UserIntent {
        show_highest: obj
            .get("show_highest")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        show_lowest: obj
            .get("show_lowest")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        focus: obj
            .get("focus")
            .and_then(Value::as_str)
            .and_then(Focus::parse)
            .unwrap_or_default(),
    }
}

fn validate_axis(
    viz: &Map<String, Value>,
    key: &str,
    axis: &'static str,
    columns: &HashSet<&str>,
) -> ValidationResult<Option<String>> {
    match optional_name(viz, key) {
        None => Ok(None),
        Some(value) => {
            let name = render(&value);
            if value.is_string() && columns.contains(name.as_str()) {
                Ok(Some(name))
            } else {
                Err(ValidationError::UnknownAxisColumn { axis, column: name })
            }
        }
    }
}

fn validate_visualization(
    value: &Value,
    analysis_type: AnalysisType,
    columns: &HashSet<&str>,
) -> ValidationResult<Option<Visualization>> {
    let viz = match value {
        Value::Null => return Ok(None),
        Value::Object(obj) if obj.is_empty() => return Ok(None),
        Value::Object(obj) => obj,
        other => {
            return Err(ValidationError::Malformed {
                field: "visualization",
                reason: format!("expected an object, got {}", other),
            })
        }
    };

    let chart_type = viz
        .get("type")
        .and_then(Value::as_str)
        .and_then(ChartType::parse)
        .ok_or_else(|| {
            ValidationError::InvalidVisualizationType(render(viz.get("type").unwrap_or(&Value::Null)))
        })?;

    let has_x = optional_name(viz, "x").is_some();
    let has_y = optional_name(viz, "y").is_some();

    if chart_type == ChartType::Histogram {
        if has_y {
            return Err(ValidationError::HistogramWithY);
        }
        if !has_x {
            return Err(ValidationError::HistogramWithoutX);
        }
    }

    if analysis_type == AnalysisType::Correlation {
        if chart_type != ChartType::Scatter {
            return Err(ValidationError::CorrelationRequiresScatter);
        }
        if !has_x || !has_y {
            return Err(ValidationError::CorrelationRequiresAxes);
        }
    }

    let x = validate_axis(viz, "x", "x-axis", columns)?;
    let y = validate_axis(viz, "y", "y-axis", columns)?;
    let color = validate_axis(viz, "color", "color column", columns)?;

    let top_n = match optional_name(viz, "top_n") {
        None => None,
        Some(value) => match value.as_u64() {
            Some(n) if n > 0 => Some(n as usize),
            _ => return Err(ValidationError::InvalidTopN(render(&value))),
        },
    };

    Ok(Some(Visualization {
        chart_type,
        x,
        y,
        color,
        top_n,
    }))
}
