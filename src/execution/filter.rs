//! Row filtering.

use tracing::debug;

use crate::dataset::infer::{coerce_numeric, coerce_numeric_column};
use crate::dataset::{Table, Value};
use crate::plan::{Filter, FilterValue, Operator};

use super::{ExecutionError, ExecutionResult};

/// Apply filters in order. Each filter sees the output of the previous one.
pub fn apply_filters(table: &Table, filters: &[Filter]) -> ExecutionResult<Table> {
    let mut working = table.clone();
    for filter in filters {
        working = apply_filter(working, filter)?;
        debug!(
            column = %filter.column,
            operator = %filter.operator,
            rows = working.num_rows(),
            "applied filter"
        );
    }
    Ok(working)
}

fn apply_filter(table: Table, filter: &Filter) -> ExecutionResult<Table> {
    let column = table
        .column(&filter.column)
        .ok_or_else(|| ExecutionError::missing(&filter.column, "filter"))?;

    let value = filter.value.clone().decode_stringified_list();

    if filter.operator.is_ordering() {
        let threshold = numeric_threshold(&filter.column, &value)?;
        let coerced = coerce_numeric_column(column);
        let keep: Vec<usize> = coerced
            .values
            .iter()
            .enumerate()
            .filter(|(_, cell)| {
                cell.as_f64()
                    .is_some_and(|n| compare(filter.operator, n, threshold))
            })
            .map(|(i, _)| i)
            .collect();
        return Ok(table.with_column(coerced)?.take(&keep));
    }

    let candidates = value.as_candidates();
    let is_member = |cell: &Value| candidates.iter().any(|c| cell.matches(c));

    let keep: Vec<usize> = column
        .values
        .iter()
        .enumerate()
        .filter(|(_, cell)| match filter.operator {
            Operator::Ne => !is_member(cell),
            _ => is_member(cell),
        })
        .map(|(i, _)| i)
        .collect();

    Ok(table.take(&keep))
}

fn numeric_threshold(column: &str, value: &FilterValue) -> ExecutionResult<f64> {
    let number = match value {
        FilterValue::Scalar(v) => coerce_numeric(v).as_f64(),
        FilterValue::List(_) => None,
    };
    number.ok_or_else(|| ExecutionError::NonNumericFilterValue {
        column: column.to_string(),
        value: match value {
            FilterValue::Scalar(v) => v.to_string(),
            FilterValue::List(items) => format!("{:?}", items),
        },
    })
}

fn compare(operator: Operator, lhs: f64, rhs: f64) -> bool {
    match operator {
        Operator::Gt => lhs > rhs,
        Operator::Lt => lhs < rhs,
        Operator::Ge => lhs >= rhs,
        Operator::Le => lhs <= rhs,
        _ => false,
    }
}
