//! Turn generator text into a JSON plan object.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use super::{PlanError, PlanResult};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(?:json|JSON)?").unwrap());

/// A JSON string literal, or a bare `NULL` / `None` token outside of words.
/// String literals are matched first so their contents are never rewritten.
static NULL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:[^"\\]|\\.)*"|\b(?:NULL|None)\b"#).unwrap());

/// Parse generator output into a JSON object.
///
/// Strips markdown code fences and rewrites `NULL`/`None` to `null`. If the
/// text still does not parse, the outermost `{ ... }` span is tried.
pub fn parse_plan_text(text: &str) -> PlanResult<Value> {
    let cleaned = CODE_FENCE.replace_all(text, "");
    let cleaned = NULL_LITERAL.replace_all(cleaned.trim(), |caps: &Captures| {
        let token = &caps[0];
        if token.starts_with('"') {
            token.to_string()
        } else {
            "null".to_string()
        }
    });

    let parsed = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(err) => {
            let span = outermost_object(&cleaned).ok_or_else(|| PlanError::Generation {
                message: err.to_string(),
                raw: truncate(text),
            })?;
            serde_json::from_str::<Value>(span).map_err(|e| PlanError::Generation {
                message: e.to_string(),
                raw: truncate(text),
            })?
        }
    };

    if !parsed.is_object() {
        return Err(PlanError::Generation {
            message: "expected a JSON object".to_string(),
            raw: truncate(text),
        });
    }
    Ok(parsed)
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 500;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
