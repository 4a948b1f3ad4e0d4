use askdata::dataset::{load_str, DataType, InferenceOptions, Table, Value};
use askdata::execution::{execute, ChartSpec, ExecutionError, COUNT_COLUMN};
use askdata::plan::{
    Aggregate, AnalysisKind, AnalysisPlan, ChartType, Filter, FilterValue, Focus, Metric,
    MetricOp, Operator, Sort, SortOrder, UserIntent, Visualization,
};

fn table(csv: &str) -> Table {
    load_str(csv, InferenceOptions::default()).unwrap()
}

fn plan(kind: AnalysisKind) -> AnalysisPlan {
    AnalysisPlan {
        kind,
        filters: vec![],
        sort: None,
        visualization: None,
        user_intent: UserIntent::default(),
    }
}

fn grouped(group_by: &[&str], metrics: Vec<Metric>) -> AnalysisKind {
    AnalysisKind::Aggregation(Aggregate {
        group_by: group_by.iter().map(|s| s.to_string()).collect(),
        metrics,
    })
}

fn sales() -> Table {
    table(
        "Region,Product,Sales\n\
         West,Chairs,100\n\
         East,Tables,250\n\
         West,Desks,300\n\
         North,Chairs,50\n\
         East,Chairs,75\n",
    )
}

#[test]
fn test_comparison_filter_coerces_percentages() {
    let data = table("Name,Growth\nA,45%\nB,  12 \nC,abc\nD,7\n");
    let mut plan = plan(AnalysisKind::Distribution);
    plan.filters = vec![Filter::new(
        "Growth",
        Operator::Gt,
        FilterValue::Scalar(Value::Int(10)),
    )];

    let output = execute(&data, &plan).unwrap();

    assert_eq!(
        output.result.column("Name").unwrap().values,
        vec![Value::text("A"), Value::text("B")]
    );
    assert_eq!(
        output.result.column("Growth").unwrap().values,
        vec![Value::Float(45.0), Value::Float(12.0)]
    );
}

#[test]
fn test_filters_apply_in_sequence() {
    let mut plan = plan(AnalysisKind::Distribution);
    plan.filters = vec![
        Filter::new(
            "Product",
            Operator::In,
            FilterValue::List(vec![Value::text("Chairs"), Value::text("Desks")]),
        ),
        Filter::new("Sales", Operator::Ge, FilterValue::Scalar(Value::text("75"))),
    ];

    let output = execute(&sales(), &plan).unwrap();

    assert_eq!(output.result.num_rows(), 3);
    assert_eq!(output.filtered, output.result);
}

#[test]
fn test_missing_filter_column_fails() {
    let mut plan = plan(AnalysisKind::Distribution);
    plan.filters = vec![Filter::new(
        "Country",
        Operator::Eq,
        FilterValue::Scalar(Value::text("USA")),
    )];

    let err = execute(&sales(), &plan).unwrap_err();
    assert!(matches!(err, ExecutionError::MissingColumn { column, .. } if column == "Country"));
}

#[test]
fn test_count_distinct_for_text_rows_for_numbers() {
    let data = table("CustomerID,OrderCount\nC1,3\nC2,5\nC1,2\nC3,\n");

    let by_customer = plan(grouped(&[], vec![Metric::new("CustomerID", MetricOp::Count)]));
    let output = execute(&data, &by_customer).unwrap();
    assert_eq!(output.result.column_names(), vec![COUNT_COLUMN]);
    assert_eq!(output.result.column(COUNT_COLUMN).unwrap().values, vec![Value::Int(3)]);

    let by_orders = plan(grouped(&[], vec![Metric::new("OrderCount", MetricOp::Count)]));
    let output = execute(&data, &by_orders).unwrap();
    assert_eq!(output.result.column(COUNT_COLUMN).unwrap().values, vec![Value::Int(4)]);
}

#[test]
fn test_group_by_with_metrics() {
    let kind = grouped(
        &["Region"],
        vec![
            Metric::new("Sales", MetricOp::Sum),
            Metric::new("Sales", MetricOp::Mean),
            Metric::new("Product", MetricOp::Count),
        ],
    );

    let output = execute(&sales(), &plan(kind)).unwrap();
    let result = &output.result;

    assert_eq!(result.column_names(), vec!["Region", "Sales", "Sales_mean", "Product"]);
    assert_eq!(
        result.column("Region").unwrap().values,
        vec![Value::text("East"), Value::text("North"), Value::text("West")]
    );
    assert_eq!(
        result.column("Sales").unwrap().values,
        vec![Value::Int(325), Value::Int(50), Value::Int(400)]
    );
    assert_eq!(
        result.column("Sales_mean").unwrap().values,
        vec![Value::Float(162.5), Value::Float(50.0), Value::Float(200.0)]
    );
    assert_eq!(result.column("Sales").unwrap().data_type, DataType::Integer);
}

#[test]
fn test_sum_of_text_column_fails() {
    let kind = grouped(&["Region"], vec![Metric::new("Product", MetricOp::Sum)]);
    let err = execute(&sales(), &plan(kind)).unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::NonNumericAggregate {
            operation: MetricOp::Sum,
            ..
        }
    ));
}

#[test]
fn test_ungrouped_multiple_metrics_returns_filtered_table() {
    let kind = grouped(
        &[],
        vec![
            Metric::new("Sales", MetricOp::Sum),
            Metric::new("Sales", MetricOp::Max),
        ],
    );
    let output = execute(&sales(), &plan(kind)).unwrap();
    assert_eq!(output.result, sales());
}

#[test]
fn test_sort_and_top_n() {
    let mut plan = plan(grouped(&["Region"], vec![Metric::new("Sales", MetricOp::Sum)]));
    plan.sort = Some(Sort {
        by: Some("Sales".into()),
        order: SortOrder::Desc,
    });
    plan.visualization = Some(Visualization {
        x: Some("Region".into()),
        y: Some("Sales".into()),
        top_n: Some(2),
        ..Visualization::new(ChartType::Bar)
    });

    let output = execute(&sales(), &plan).unwrap();

    assert_eq!(
        output.result.column("Region").unwrap().values,
        vec![Value::text("West"), Value::text("East")]
    );
    assert_eq!(output.filtered.num_rows(), 5);
}

#[test]
fn test_top_n_ignored_for_dual_intent() {
    let mut plan = plan(grouped(&["Region"], vec![Metric::new("Sales", MetricOp::Sum)]));
    plan.sort = Some(Sort {
        by: Some("Sales".into()),
        order: SortOrder::Desc,
    });
    plan.visualization = Some(Visualization {
        x: Some("Region".into()),
        top_n: Some(1),
        ..Visualization::new(ChartType::Bar)
    });
    plan.user_intent = UserIntent {
        show_highest: true,
        show_lowest: true,
        focus: Focus::Both,
    };

    let output = execute(&sales(), &plan).unwrap();
    assert_eq!(output.result.num_rows(), 3);
}

#[test]
fn test_sort_on_missing_column_is_skipped() {
    let mut plan = plan(grouped(&["Region"], vec![Metric::new("Sales", MetricOp::Sum)]));
    plan.sort = Some(Sort {
        by: Some("Product".into()),
        order: SortOrder::Desc,
    });

    let output = execute(&sales(), &plan).unwrap();
    assert_eq!(
        output.result.column("Region").unwrap().values,
        vec![Value::text("East"), Value::text("North"), Value::text("West")]
    );
}

#[test]
fn test_chart_y_falls_back_to_first_metric() {
    let mut plan = plan(grouped(&["Region"], vec![Metric::new("Sales", MetricOp::Max)]));
    plan.visualization = Some(Visualization {
        x: Some("Region".into()),
        color: Some("Product".into()),
        ..Visualization::new(ChartType::Bar)
    });

    let output = execute(&sales(), &plan).unwrap();

    assert_eq!(
        output.chart,
        Some(ChartSpec::Bar {
            x: "Region".into(),
            y: "Sales".into(),
            color: None,
        })
    );
}

#[test]
fn test_chart_y_outside_result_fails() {
    let mut plan = plan(grouped(&["Region"], vec![Metric::new("Sales", MetricOp::Sum)]));
    plan.visualization = Some(Visualization {
        x: Some("Region".into()),
        y: Some("Product".into()),
        ..Visualization::new(ChartType::Bar)
    });

    let err = execute(&sales(), &plan).unwrap_err();
    match err {
        ExecutionError::InvalidYAxis { y, available } => {
            assert_eq!(y, "Product");
            assert_eq!(available, vec!["Region", "Sales"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_chart_without_x_is_suppressed() {
    let mut plan = plan(grouped(&["Region"], vec![Metric::new("Sales", MetricOp::Sum)]));
    plan.visualization = Some(Visualization {
        y: Some("Sales".into()),
        ..Visualization::new(ChartType::Line)
    });

    let output = execute(&sales(), &plan).unwrap();
    assert!(output.chart.is_none());
}

#[test]
fn test_execution_is_deterministic() {
    let mut plan = plan(grouped(&["Product"], vec![Metric::new("Sales", MetricOp::Median)]));
    plan.sort = Some(Sort {
        by: Some("Sales".into()),
        order: SortOrder::Asc,
    });

    let first = execute(&sales(), &plan).unwrap();
    let second = execute(&sales(), &plan).unwrap();
    assert_eq!(first, second);
}
