//! Prompt text for the planning and explanation calls.

use super::{ExplainRequest, OracleResult};

pub const PLANNER_SYSTEM: &str = r#"You translate questions about a table into an analysis plan.

Reply with one JSON object and nothing else: no markdown, no prose.
Use only the column names you are given. Write null in lowercase.

Schema:
{
  "analysis_type": "comparison | trend | aggregation | correlation | distribution",
  "filters": [{"column": "<column>", "operator": "== | != | > | < | >= | <= | in", "value": <scalar or list>}],
  "group_by": ["<column>"],
  "metrics": [{"column": "<column>", "operation": "sum | mean | count | min | max | median | std"}],
  "sort": {"by": "<column>", "order": "asc | desc"},
  "visualization": {"type": "bar | line | scatter | histogram", "x": "<column> | null", "y": "<column> | null", "color": "<column> | null", "top_n": <integer> | null}
}

Rules:
- The "in" operator takes a JSON list, never a string that looks like a list.
- Filter values are real values from the question. Leave filters empty rather than guessing.
- Chart types never appear as a metric operation.
- A metric result keeps the name of its column, so sort.by names the column.
- count works on any column.

By analysis type:
- comparison: group by the category being compared. To compare specific members use an "in" filter on that category. Bar chart with x on the category.
- trend: group by a time column, line chart with x on that column.
- aggregation: "by <category>" means group_by; "for <value>" means a filter. Never filter and group on the same column.
- correlation: no metrics, no group_by, scatter chart with x and y set to the two numeric columns.
- distribution: no metrics, no group_by, histogram with x on the column and y null.

Ranking:
- "highest", "top", "largest" sort desc; "lowest", "bottom", "smallest" sort asc.
- A single winner means top_n 1; "top 5" means top_n 5.
- When both extremes are asked for, sort the full result and leave top_n null.
"#;

pub const ANALYST_SYSTEM: &str = r#"You are a data analyst explaining results to business readers.

- Use only the results you are given. Do not invent trends or causes.
- Plain, non-technical language.
- Be brief and concrete.
"#;

pub fn plan_user_prompt(columns: &[String], question: &str) -> String {
    format!("Columns: {:?}\nQuestion: {}\n", columns, question)
}

pub fn explain_user_prompt(request: &ExplainRequest) -> OracleResult<String> {
    let payload = serde_json::to_string_pretty(request)?;
    Ok(format!(
        r#"Question:
{question}

Analysis:
{payload}

Answer the question directly in one or two sentences, then give three to five
bullet points with the key figures. Quote exact numbers. If the question asks
for a list, list the entities. Avoid database terms.

Format:

Direct Answer and key insights:
<answer>
• point
• point
• point
"#,
        question = request.question,
        payload = payload,
    ))
}

pub fn describe_user_prompt(columns: &[String]) -> OracleResult<String> {
    let overview = serde_json::json!({ "columns": columns });
    Ok(format!(
        "Describe briefly what this dataset contains.\n\n{}\n\nKeep it short and do not guess at statistics.\n",
        serde_json::to_string_pretty(&overview)?
    ))
}
