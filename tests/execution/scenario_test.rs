//! End-to-end runs of generator output through preparation and execution.

use askdata::compress::{compress, CompactResult, DEFAULT_MAX_ROWS};
use askdata::dataset::{load_str, InferenceOptions, Table, Value};
use askdata::execution::{execute, ChartSpec};
use askdata::plan::{prepare, AnalysisType, Focus, PlanError};
use serde_json::json;

fn population() -> Table {
    load_str(
        "Country,Population\nUSA,331\nIndia,1380\nBrazil,212\n",
        InferenceOptions::default(),
    )
    .unwrap()
}

fn sales() -> Table {
    load_str(
        "Country,Region,Sales,Profit\n\
         USA,West,120,30\n\
         UK,North,80,12\n\
         USA,East,200,45\n\
         France,North,60,5\n\
         UK,South,90,20\n",
        InferenceOptions::default(),
    )
    .unwrap()
}

#[test]
fn test_highest_population() {
    let data = population();
    let text = r#"```json
{
  "analysis_type": "aggregation",
  "filters": [],
  "group_by": ["Country"],
  "metrics": [{"column": "Population", "operation": "sum"}],
  "sort": {"by": "Population", "order": "desc"},
  "visualization": {"type": "bar", "x": NULL, "y": "Population", "color": NULL, "top_n": 1}
}
```"#;

    let plan = prepare(
        text,
        &data.column_names(),
        "Which country has the highest population?",
    )
    .unwrap();
    assert_eq!(plan.user_intent.focus, Focus::Highest);

    let output = execute(&data, &plan).unwrap();

    assert_eq!(output.result.records(), vec![json!({"Country": "India", "Population": 1380})
        .as_object()
        .cloned()
        .unwrap()]);
    assert_eq!(
        output.chart,
        Some(ChartSpec::Bar {
            x: "Country".into(),
            y: "Population".into(),
            color: None,
        })
    );

    let compact = compress(&output.result, &plan, DEFAULT_MAX_ROWS);
    assert_eq!(compact.len(), 1);
}

#[test]
fn test_aggregation_ignores_filter_on_grouped_column() {
    let data = load_str(
        "Category,Year,Sales\nA,2023,10\nB,2023,20\nC,2023,30\nA,2022,5\n",
        InferenceOptions::default(),
    )
    .unwrap();
    let text = r#"{
        "analysis_type": "aggregation",
        "filters": [
            {"column": "Category", "operator": "==", "value": "A"},
            {"column": "Year", "operator": ">=", "value": 2023}
        ],
        "group_by": ["Category"],
        "metrics": [{"column": "Sales", "operation": "sum"}],
        "sort": null,
        "visualization": {"type": "bar", "x": null, "y": "Sales", "color": null, "top_n": null}
    }"#;

    let plan = prepare(text, &data.column_names(), "Total sales by category in 2023").unwrap();
    assert_eq!(plan.filters.len(), 1);
    assert_eq!(plan.filters[0].column, "Year");

    let output = execute(&data, &plan).unwrap();

    assert_eq!(output.filtered.num_rows(), 3);
    assert_eq!(
        output.result.column("Category").unwrap().values,
        vec![Value::text("A"), Value::text("B"), Value::text("C")]
    );
    assert_eq!(
        output.result.column("Sales").unwrap().values,
        vec![Value::Int(10), Value::Int(20), Value::Int(30)]
    );
    assert_eq!(output.chart.as_ref().map(ChartSpec::x), Some("Category"));
}

#[test]
fn test_distribution_of_sales() {
    let data = sales();
    let text = r#"{
        "analysis_type": "distribution",
        "filters": [],
        "group_by": ["Region"],
        "metrics": [{"column": "Sales", "operation": "mean"}],
        "sort": null,
        "visualization": {"type": "bar", "x": "Sales", "y": "Sales", "color": null, "top_n": null}
    }"#;

    let plan = prepare(text, &data.column_names(), "What is the distribution of sales?").unwrap();
    assert_eq!(plan.analysis_type(), AnalysisType::Distribution);

    let output = execute(&data, &plan).unwrap();

    assert_eq!(output.result, data);
    assert_eq!(
        output.chart,
        Some(ChartSpec::Histogram {
            x: "Sales".into(),
            color: None,
        })
    );
}

#[test]
fn test_comparison_of_countries() {
    let data = sales();
    let text = r#"Here is the plan:
    {"analysis_type": "comparison",
     "filters": [{"column": "Country", "operator": "==", "value": ["USA", "UK"]}],
     "group_by": ["Country"],
     "metrics": [{"column": "Sales", "operation": "sum"}],
     "sort": {"by": "Sales", "order": "desc"},
     "visualization": {"type": "bar", "x": null, "y": "Sales", "color": null, "top_n": null}}
    Let me know if you need anything else."#;

    let plan = prepare(text, &data.column_names(), "Compare sales between USA and UK").unwrap();
    let output = execute(&data, &plan).unwrap();

    assert_eq!(
        output.result.column("Country").unwrap().values,
        vec![Value::text("USA"), Value::text("UK")]
    );
    assert_eq!(
        output.result.column("Sales").unwrap().values,
        vec![Value::Int(320), Value::Int(170)]
    );
    assert_eq!(output.filtered.num_rows(), 4);
    assert_eq!(output.chart.as_ref().map(ChartSpec::x), Some("Country"));
}

#[test]
fn test_correlation_keeps_all_rows() {
    let data = sales();
    let text = r#"{
        "analysis_type": "correlation",
        "filters": [{"column": "Sales", "operator": ">", "value": "70"}],
        "group_by": [],
        "metrics": [],
        "sort": null,
        "visualization": {"type": "scatter", "x": "Sales", "y": "Profit", "color": "Region", "top_n": null}
    }"#;

    let plan = prepare(text, &data.column_names(), "Is profit related to sales?").unwrap();
    let output = execute(&data, &plan).unwrap();

    assert_eq!(output.result.num_rows(), 4);
    assert_eq!(
        output.chart,
        Some(ChartSpec::Scatter {
            x: "Sales".into(),
            y: "Profit".into(),
            color: Some("Region".into()),
        })
    );
}

#[test]
fn test_listing_question_compresses_to_values() {
    let data = sales();
    let text = r#"{
        "analysis_type": "aggregation",
        "filters": [{"column": "Region", "operator": "==", "value": "North"}],
        "group_by": [],
        "metrics": [],
        "sort": null,
        "visualization": null
    }"#;

    let plan = prepare(text, &data.column_names(), "List the countries in the North region").unwrap();
    let output = execute(&data, &plan).unwrap();

    assert_eq!(
        compress(&output.result, &plan, DEFAULT_MAX_ROWS),
        CompactResult::Values(vec!["UK".into(), "France".into()])
    );
    assert!(output.chart.is_none());
}

#[test]
fn test_unparseable_generator_output() {
    let err = prepare("I could not build a plan.", &sales().column_names(), "?").unwrap_err();
    assert!(matches!(err, PlanError::Generation { .. }));
}

#[test]
fn test_plan_referencing_unknown_column() {
    let text = r#"{
        "analysis_type": "aggregation",
        "filters": [],
        "group_by": ["Continent"],
        "metrics": [{"column": "Sales", "operation": "sum"}],
        "sort": null,
        "visualization": null
    }"#;

    let err = prepare(text, &sales().column_names(), "sales by continent").unwrap_err();
    assert_eq!(err.to_string(), "Invalid plan: Invalid group_by column: Continent");
}
