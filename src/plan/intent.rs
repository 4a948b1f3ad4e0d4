//! Lexical intent detection over the question text.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{Focus, UserIntent};

static HIGHEST_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(highest|maximum|top|largest|most)\b").unwrap());

static LOWEST_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(lowest|minimum|bottom|smallest|least)\b").unwrap());

static LIST_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(list|show all|name all|enumerate|what are all)\b").unwrap()
});

/// Phrases that route a question to the dataset profile instead of the planner.
const DATASET_INFO_PHRASES: &[&str] = &[
    "dataset information",
    "dataset info",
    "describe dataset",
    "data overview",
    "summary of dataset",
    "about the dataset",
    "dataset summary",
];

/// Derive the user's intent from the question alone.
///
/// Highest and lowest markers are matched as whole words. Enumeration
/// markers only count when neither extreme is mentioned.
pub fn detect_intent(question: &str) -> UserIntent {
    let show_highest = HIGHEST_MARKERS.is_match(question);
    let show_lowest = LOWEST_MARKERS.is_match(question);

    let focus = match (show_highest, show_lowest) {
        (true, true) => Focus::Both,
        (true, false) => Focus::Highest,
        (false, true) => Focus::Lowest,
        (false, false) if LIST_MARKERS.is_match(question) => Focus::List,
        (false, false) => Focus::General,
    };

    UserIntent {
        show_highest,
        show_lowest,
        focus,
    }
}

/// Whether the question asks about the dataset itself.
pub fn is_dataset_info_question(question: &str) -> bool {
    let lowered = question.to_lowercase();
    DATASET_INFO_PHRASES.iter().any(|p| lowered.contains(p))
}
