//! Repair of raw generator plans.
//!
//! The sanitizer works on the raw JSON object before validation. It never
//! fails: anything it cannot make sense of is left for the validator to
//! reject.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::intent::detect_intent;
use super::types::{Focus, PLACEHOLDER_VALUES, VISUALIZATION_TOKENS};

type Object = Map<String, Value>;

/// Correct the known failure patterns of a generated plan.
///
/// `user_intent` is always re-derived from `question`. A plan that is not a
/// JSON object is returned unchanged.
pub fn sanitize(mut plan: Value, question: &str) -> Value {
    let Some(obj) = plan.as_object_mut() else {
        return plan;
    };

    let intent = detect_intent(question);
    obj.insert(
        "user_intent".to_string(),
        json!({
            "show_highest": intent.show_highest,
            "show_lowest": intent.show_lowest,
            "focus": intent.focus,
        }),
    );

    strip_visualization_metrics(obj);
    drop_placeholder_filters(obj);

    let analysis_type = obj
        .get("analysis_type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match analysis_type.as_str() {
        "distribution" => {
            clear_grouping(obj);
            if let Some(viz) = visualization_mut(obj) {
                viz.insert("type".to_string(), json!("histogram"));
                viz.insert("y".to_string(), Value::Null);
            }
        }
        "correlation" => {
            clear_grouping(obj);
            if let Some(viz) = visualization_mut(obj) {
                viz.insert("type".to_string(), json!("scatter"));
            }
        }
        "aggregation" => {
            drop_filters_on_grouped_columns(obj);
            default_x_to_first_group(obj);
            if intent.focus == Focus::Both {
                if let Some(viz) = visualization_mut(obj) {
                    if viz.get("top_n").is_some_and(|v| !v.is_null()) {
                        debug!("clearing top_n so both extremes stay visible");
                        viz.insert("top_n".to_string(), Value::Null);
                    }
                }
            }
        }
        "comparison" => {
            default_x_to_first_group(obj);
            rewrite_list_equality_as_in(obj);
        }
        "trend" => {
            if let Some(viz) = visualization_mut(obj) {
                viz.insert("type".to_string(), json!("line"));
            }
            default_x_to_first_group(obj);
        }
        _ => {}
    }

    plan
}

/// A field counts as unset when missing, null, or the string "null"/"NULL".
fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s == "null" || s == "NULL",
        Some(_) => false,
    }
}

/// The visualization object, when present and non-empty.
fn visualization_mut(obj: &mut Object) -> Option<&mut Object> {
    obj.get_mut("visualization")
        .and_then(Value::as_object_mut)
        .filter(|viz| !viz.is_empty())
}

fn group_columns(obj: &Object) -> Vec<String> {
    obj.get("group_by")
        .and_then(Value::as_array)
        .map(|cols| {
            cols.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn clear_grouping(obj: &mut Object) {
    obj.insert("metrics".to_string(), json!([]));
    obj.insert("group_by".to_string(), json!([]));
}

fn strip_visualization_metrics(obj: &mut Object) {
    let Some(metrics) = obj.get_mut("metrics").and_then(Value::as_array_mut) else {
        return;
    };
    metrics.retain(|m| {
        let operation = m.get("operation").and_then(Value::as_str);
        let is_chart = operation.is_some_and(|op| VISUALIZATION_TOKENS.contains(&op));
        if is_chart {
            debug!(metric = %m, "dropping metric with a chart type as its operation");
        }
        !is_chart
    });
}

fn drop_placeholder_filters(obj: &mut Object) {
    let Some(filters) = obj.get_mut("filters").and_then(Value::as_array_mut) else {
        return;
    };
    filters.retain(|f| {
        let value = f.get("value").and_then(Value::as_str);
        let is_placeholder = value.is_some_and(|v| PLACEHOLDER_VALUES.contains(&v));
        if is_placeholder {
            debug!(filter = %f, "dropping filter with a placeholder value");
        }
        !is_placeholder
    });
}

/// Filtering and grouping on the same column contradict each other; grouping wins.
fn drop_filters_on_grouped_columns(obj: &mut Object) {
    let groups = group_columns(obj);
    if groups.is_empty() {
        return;
    }
    let Some(filters) = obj.get_mut("filters").and_then(Value::as_array_mut) else {
        return;
    };
    filters.retain(|f| {
        let grouped = f
            .get("column")
            .and_then(Value::as_str)
            .is_some_and(|c| groups.iter().any(|g| g == c));
        if grouped {
            debug!(filter = %f, "dropping filter on a group_by column");
        }
        !grouped
    });
}

fn default_x_to_first_group(obj: &mut Object) {
    let Some(first) = group_columns(obj).into_iter().next() else {
        return;
    };
    if let Some(viz) = visualization_mut(obj) {
        if is_unset(viz.get("x")) {
            debug!(x = %first, "defaulting visualization.x to the first group_by column");
            viz.insert("x".to_string(), Value::String(first));
        }
    }
}

/// `column == [a, b]` on a grouped column means membership.
fn rewrite_list_equality_as_in(obj: &mut Object) {
    let groups = group_columns(obj);
    let Some(filters) = obj.get_mut("filters").and_then(Value::as_array_mut) else {
        return;
    };
    for filter in filters.iter_mut().filter_map(Value::as_object_mut) {
        let grouped = filter
            .get("column")
            .and_then(Value::as_str)
            .is_some_and(|c| groups.iter().any(|g| g == c));
        let list_equality = filter.get("operator").and_then(Value::as_str) == Some("==")
            && filter.get("value").is_some_and(Value::is_array);
        if grouped && list_equality {
            debug!("rewriting list equality filter to 'in'");
            filter.insert("operator".to_string(), json!("in"));
        }
    }
}
