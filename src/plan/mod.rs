//! Analysis plans: from generator text to a typed, validated plan.
//!
//! ```text
//! generator text
//!      │
//!      ▼
//! ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │  repair  │──▶│ sanitize │──▶│ validate │──▶ AnalysisPlan
//! └──────────┘   └──────────┘   └──────────┘
//!  JSON object    raw JSON        typed plan
//! ```
//!
//! Repair and sanitize never look at the data. Validation checks the plan
//! against the dataset's column names and is the only constructor of
//! [`AnalysisPlan`].

pub mod intent;
mod repair;
mod sanitize;
pub mod types;
mod validate;

pub use intent::{detect_intent, is_dataset_info_question};
pub use repair::parse_plan_text;
pub use sanitize::sanitize;
pub use types::*;
pub use validate::{validate, ValidationError, ValidationResult, REQUIRED_KEYS};

/// Result type for plan production.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors raised while turning a question into a plan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// The generator produced text that is not a JSON object.
    #[error("Plan generation failed: {message}")]
    Generation { message: String, raw: String },

    #[error("Invalid plan: {0}")]
    Validation(#[from] ValidationError),
}

/// Turn generator text into a validated plan: repair, sanitize, validate.
pub fn prepare(text: &str, columns: &[String], question: &str) -> PlanResult<AnalysisPlan> {
    let raw = parse_plan_text(text)?;
    let raw = sanitize(raw, question);
    Ok(validate(&raw, columns)?)
}
