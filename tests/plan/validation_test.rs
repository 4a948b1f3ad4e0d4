use askdata::plan::{
    validate, AnalysisType, ChartType, FilterValue, MetricOp, Operator, SortOrder,
    ValidationError, REQUIRED_KEYS,
};
use askdata::dataset::Value;
use serde_json::{json, Value as Json};

fn columns() -> Vec<String> {
    ["Country", "Region", "Sales", "Profit", "Year"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn valid_plan() -> Json {
    json!({
        "analysis_type": "aggregation",
        "filters": [{"column": "Year", "operator": ">=", "value": 2020}],
        "group_by": ["Region"],
        "metrics": [{"column": "Sales", "operation": "sum"}],
        "sort": {"by": "Sales", "order": "desc"},
        "visualization": {"type": "bar", "x": "Region", "y": "Sales", "color": null, "top_n": 5}
    })
}

fn with(key: &str, value: Json) -> Json {
    let mut plan = valid_plan();
    plan[key] = value;
    plan
}

fn with_viz(viz: Json) -> Json {
    with("visualization", viz)
}

#[test]
fn test_valid_plan() {
    let plan = validate(&valid_plan(), &columns()).unwrap();

    assert_eq!(plan.analysis_type(), AnalysisType::Aggregation);
    assert_eq!(plan.filters[0].operator, Operator::Ge);
    assert_eq!(plan.filters[0].value, FilterValue::Scalar(Value::Int(2020)));
    assert_eq!(plan.metrics()[0].operation, MetricOp::Sum);
    assert_eq!(plan.sort.as_ref().unwrap().order, SortOrder::Desc);
    assert_eq!(plan.top_n(), Some(5));
}

#[test]
fn test_each_missing_key_is_named() {
    for key in REQUIRED_KEYS {
        let mut plan = valid_plan();
        plan.as_object_mut().unwrap().remove(key);

        let err = validate(&plan, &columns()).unwrap_err();
        assert_eq!(err, ValidationError::MissingKey(key));
        assert_eq!(err.to_string(), format!("Missing key: {}", key));
    }
}

#[test]
fn test_non_object_plan() {
    assert_eq!(
        validate(&json!(["not", "a", "plan"]), &columns()).unwrap_err(),
        ValidationError::NotAnObject
    );
}

#[test]
fn test_invalid_analysis_type() {
    let err = validate(&with("analysis_type", json!("forecast")), &columns()).unwrap_err();
    assert_eq!(err, ValidationError::InvalidAnalysisType("forecast".into()));
}

#[test]
fn test_unknown_filter_column() {
    let plan = with(
        "filters",
        json!([{"column": "Continent", "operator": "==", "value": "Asia"}]),
    );
    assert_eq!(
        validate(&plan, &columns()).unwrap_err(),
        ValidationError::UnknownFilterColumn("Continent".into())
    );
}

#[test]
fn test_invalid_operator() {
    let plan = with(
        "filters",
        json!([{"column": "Country", "operator": "like", "value": "U%"}]),
    );
    assert_eq!(
        validate(&plan, &columns()).unwrap_err(),
        ValidationError::InvalidOperator("like".into())
    );
}

#[test]
fn test_in_requires_list() {
    let plan = with(
        "filters",
        json!([{"column": "Country", "operator": "in", "value": "USA"}]),
    );
    assert_eq!(
        validate(&plan, &columns()).unwrap_err(),
        ValidationError::InRequiresList("Country".into())
    );
}

#[test]
fn test_in_accepts_stringified_list() {
    let plan = with(
        "filters",
        json!([{"column": "Country", "operator": "in", "value": "['USA', 'UK']"}]),
    );
    let plan = validate(&plan, &columns()).unwrap();
    assert_eq!(
        plan.filters[0].value,
        FilterValue::List(vec![Value::text("USA"), Value::text("UK")])
    );
}

#[test]
fn test_nested_filter_value_rejected() {
    let plan = with(
        "filters",
        json!([{"column": "Country", "operator": "in", "value": [["USA"]]}]),
    );
    assert_eq!(
        validate(&plan, &columns()).unwrap_err(),
        ValidationError::InvalidFilterValue("Country".into())
    );
}

#[test]
fn test_unknown_group_by_column() {
    let err = validate(&with("group_by", json!(["Continent"])), &columns()).unwrap_err();
    assert_eq!(err, ValidationError::UnknownGroupByColumn("Continent".into()));
}

#[test]
fn test_invalid_metric_operation() {
    let plan = with("metrics", json!([{"column": "Sales", "operation": "average"}]));
    assert_eq!(
        validate(&plan, &columns()).unwrap_err(),
        ValidationError::InvalidMetricOperation("average".into())
    );
}

#[test]
fn test_chart_metric_operations_are_dropped() {
    let plan = with(
        "metrics",
        json!([
            {"column": "Sales", "operation": "line"},
            {"column": "Sales", "operation": "mean"}
        ]),
    );
    let plan = validate(&plan, &columns()).unwrap();
    assert_eq!(plan.metrics().len(), 1);
    assert_eq!(plan.metrics()[0].operation, MetricOp::Mean);
}

#[test]
fn test_unknown_metric_column() {
    let plan = with("metrics", json!([{"column": "Revenue", "operation": "sum"}]));
    assert_eq!(
        validate(&plan, &columns()).unwrap_err(),
        ValidationError::UnknownMetricColumn("Revenue".into())
    );
}

#[test]
fn test_distribution_with_metrics_rejected() {
    let mut plan = valid_plan();
    plan["analysis_type"] = json!("distribution");
    plan["visualization"] = json!({"type": "histogram", "x": "Sales"});

    assert_eq!(
        validate(&plan, &columns()).unwrap_err(),
        ValidationError::MetricsNotAllowed(AnalysisType::Distribution)
    );
}

#[test]
fn test_sort_may_be_null_or_omit_order() {
    let plan = validate(&with("sort", Json::Null), &columns()).unwrap();
    assert!(plan.sort.is_none());

    let plan = validate(&with("sort", json!({"by": "Sales"})), &columns()).unwrap();
    assert_eq!(plan.sort.unwrap().order, SortOrder::Asc);

    let plan = validate(&with("sort", json!({"by": "Sales", "order": "DESC"})), &columns()).unwrap();
    assert_eq!(plan.sort.unwrap().order, SortOrder::Desc);
}

#[test]
fn test_empty_visualization_is_accepted() {
    let plan = validate(&with_viz(json!({})), &columns()).unwrap();
    assert!(plan.visualization.is_none());

    let plan = validate(&with_viz(Json::Null), &columns()).unwrap();
    assert!(plan.visualization.is_none());
}

#[test]
fn test_invalid_visualization_type() {
    let err = validate(&with_viz(json!({"type": "pie", "x": "Region"})), &columns()).unwrap_err();
    assert_eq!(err, ValidationError::InvalidVisualizationType("pie".into()));
}

#[test]
fn test_histogram_axes() {
    let err = validate(
        &with_viz(json!({"type": "histogram", "x": "Sales", "y": "Profit"})),
        &columns(),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::HistogramWithY);

    let err = validate(&with_viz(json!({"type": "histogram", "x": null})), &columns()).unwrap_err();
    assert_eq!(err, ValidationError::HistogramWithoutX);

    let plan = validate(
        &with_viz(json!({"type": "histogram", "x": "Sales", "y": "NULL"})),
        &columns(),
    )
    .unwrap();
    assert_eq!(plan.visualization.unwrap().chart_type, ChartType::Histogram);
}

fn correlation(viz: Json) -> Json {
    json!({
        "analysis_type": "correlation",
        "filters": [],
        "group_by": [],
        "metrics": [],
        "sort": null,
        "visualization": viz
    })
}

#[test]
fn test_correlation_requires_scatter_with_both_axes() {
    let err = validate(
        &correlation(json!({"type": "line", "x": "Sales", "y": "Profit"})),
        &columns(),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::CorrelationRequiresScatter);

    let err = validate(
        &correlation(json!({"type": "scatter", "x": "Sales", "y": null})),
        &columns(),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::CorrelationRequiresAxes);

    let plan = validate(
        &correlation(json!({"type": "scatter", "x": "Sales", "y": "Profit"})),
        &columns(),
    )
    .unwrap();
    assert_eq!(plan.analysis_type(), AnalysisType::Correlation);
}

#[test]
fn test_correlation_without_visualization_is_accepted() {
    assert!(validate(&correlation(json!({})), &columns()).is_ok());
}

#[test]
fn test_axis_columns_must_exist() {
    let err = validate(&with_viz(json!({"type": "bar", "x": "Continent", "y": "Sales"})), &columns())
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnknownAxisColumn {
            axis: "x-axis",
            column: "Continent".into()
        }
    );

    let err = validate(&with_viz(json!({"type": "bar", "x": "Region", "y": "Revenue"})), &columns())
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid y-axis: Revenue");

    let err = validate(
        &with_viz(json!({"type": "bar", "x": "Region", "y": "Sales", "color": "Shade"})),
        &columns(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Invalid color column: Shade");
}

#[test]
fn test_top_n_must_be_positive_integer() {
    for bad in [json!(0), json!(-3), json!(2.5), json!("five")] {
        let err = validate(
            &with_viz(json!({"type": "bar", "x": "Region", "y": "Sales", "top_n": bad})),
            &columns(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTopN(_)), "{:?}", err);
    }

    let plan = validate(
        &with_viz(json!({"type": "bar", "x": "Region", "y": "Sales", "top_n": "NULL"})),
        &columns(),
    )
    .unwrap();
    assert_eq!(plan.top_n(), None);
}

#[test]
fn test_validated_plan_serializes_back_to_flat_shape() {
    let plan = validate(&valid_plan(), &columns()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["analysis_type"], json!("aggregation"));
    assert_eq!(json["group_by"], json!(["Region"]));
    assert_eq!(json["visualization"]["type"], json!("bar"));
    assert_eq!(json["visualization"]["top_n"], json!(5));
}
