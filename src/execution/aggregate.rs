//! Grouping and metric computation.

use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::{Column, DataType, Table, Value};
use crate::plan::{Aggregate, Metric, MetricOp};

use super::{ExecutionError, ExecutionResult};

/// Name of the single column produced by an ungrouped count.
pub const COUNT_COLUMN: &str = "count";

/// Aggregate the filtered table.
///
/// * no grouping and a single `count` metric: a one-row `count` table
/// * grouping with metrics: one row per group, ordered by key
/// * grouping without metrics: first row of each distinct key combination
/// * anything else: the table unchanged
pub fn aggregate(table: &Table, aggregate: Option<&Aggregate>) -> ExecutionResult<Table> {
    let Some(aggregate) = aggregate else {
        return Ok(table.clone());
    };

    match (aggregate.group_by.as_slice(), aggregate.metrics.as_slice()) {
        ([], [metric]) if metric.operation == MetricOp::Count => count(table, metric),
        ([], _) => Ok(table.clone()),
        (groups, []) => distinct_groups(table, groups),
        (_, _) => grouped(table, aggregate),
    }
}

fn count(table: &Table, metric: &Metric) -> ExecutionResult<Table> {
    let column = table
        .column(&metric.column)
        .ok_or_else(|| ExecutionError::missing(&metric.column, "aggregation"))?;

    let n = if column.data_type.is_textual() {
        column.distinct_count()
    } else {
        table.num_rows()
    };

    Ok(Table::new(vec![Column::new(
        COUNT_COLUMN,
        DataType::Integer,
        vec![Value::Int(n as i64)],
    )])?)
}

fn key_columns<'a>(table: &'a Table, groups: &[String]) -> ExecutionResult<Vec<&'a Column>> {
    groups
        .iter()
        .map(|g| {
            table
                .column(g)
                .ok_or_else(|| ExecutionError::missing(g, "aggregation"))
        })
        .collect()
}

fn key_of(columns: &[&Column], row: usize) -> Vec<Value> {
    columns.iter().map(|c| c.values[row].clone()).collect()
}

fn distinct_groups(table: &Table, groups: &[String]) -> ExecutionResult<Table> {
    let keys = key_columns(table, groups)?;
    let mut seen = BTreeSet::new();
    let rows: Vec<usize> = (0..table.num_rows())
        .filter(|&row| seen.insert(key_of(&keys, row)))
        .collect();
    Ok(table.take(&rows))
}

fn grouped(table: &Table, aggregate: &Aggregate) -> ExecutionResult<Table> {
    let keys = key_columns(table, &aggregate.group_by)?;

    let mut groups: BTreeMap<Vec<Value>, Vec<usize>> = BTreeMap::new();
    for row in 0..table.num_rows() {
        let key = key_of(&keys, row);
        if key.iter().any(Value::is_null) {
            continue;
        }
        groups.entry(key).or_default().push(row);
    }

    let mut columns: Vec<Column> = keys
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let values = groups.keys().map(|k| k[i].clone()).collect();
            Column::new(source.name.clone(), source.data_type, values)
        })
        .collect();

    for (metric, name) in aggregate.metrics.iter().zip(aggregate.output_names()) {
        let source = table
            .column(&metric.column)
            .ok_or_else(|| ExecutionError::missing(&metric.column, "aggregation"))?;

        if metric.operation.requires_numeric()
            && matches!(source.data_type, DataType::Text | DataType::Boolean)
        {
            return Err(ExecutionError::NonNumericAggregate {
                column: metric.column.clone(),
                operation: metric.operation,
            });
        }

        let values = groups
            .values()
            .map(|rows| {
                let cells: Vec<&Value> = rows
                    .iter()
                    .map(|&r| &source.values[r])
                    .filter(|v| !v.is_null())
                    .collect();
                compute(metric.operation, source.data_type, &cells)
            })
            .collect();
        columns.push(Column::from_values(name, values));
    }

    Ok(Table::new(columns)?)
}

/// Apply one metric to the non-null cells of a group.
pub fn compute(operation: MetricOp, data_type: DataType, cells: &[&Value]) -> Value {
    let numbers = || cells.iter().filter_map(|v| v.as_f64());

    match operation {
        MetricOp::Count => Value::Int(cells.len() as i64),
        MetricOp::Min => cells.iter().min().map(|v| (*v).clone()).unwrap_or_default(),
        MetricOp::Max => cells.iter().max().map(|v| (*v).clone()).unwrap_or_default(),
        MetricOp::Sum if data_type == DataType::Integer => {
            let total = cells
                .iter()
                .try_fold(0i64, |acc, v| match v {
                    Value::Int(i) => acc.checked_add(*i),
                    _ => None,
                });
            match total {
                Some(total) => Value::Int(total),
                None => Value::Float(numbers().sum()),
            }
        }
        MetricOp::Sum => Value::Float(numbers().sum()),
        MetricOp::Mean => {
            let values: Vec<f64> = numbers().collect();
            if values.is_empty() {
                Value::Null
            } else {
                Value::Float(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
        MetricOp::Median => {
            let mut values: Vec<f64> = numbers().collect();
            if values.is_empty() {
                return Value::Null;
            }
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                Value::Float((values[mid - 1] + values[mid]) / 2.0)
            } else {
                Value::Float(values[mid])
            }
        }
        MetricOp::Std => {
            let values: Vec<f64> = numbers().collect();
            if values.len() < 2 {
                return Value::Null;
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Value::Float(variance.sqrt())
        }
    }
}
