//! Heuristic extraction of a task proposal from free-form text.
//!
//! Extraction is pattern and keyword based; there is no grammar. The rule
//! lists below are exhaustive and applied in the documented order.

use regex::Regex;
use std::sync::LazyLock;

/// Sentinel returned by [`extract_date_phrase`] for "end of next week".
pub const END_OF_NEXT_WEEK: &str = "end of next week";

const MIN_TITLE_CHARS: usize = 10;
const FALLBACK_TITLE_CHARS: usize = 80;

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals exercised by the extractor tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("extractor pattern must compile")
}

static POLITE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^\s*(please|pls|kindly)\b[:,]?\s*"));
static COURTESY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^\s*(could you|can you|would you)\b[:,]?\s*"));
static SCAFFOLD_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)^\s*(please\s+)?(add|create|make)\s+(a\s+)?(task|todo)\s+(to\s+my\s+)?(planka\s+board\s*)?(that\s+)?",
    )
});
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));
static TITLE_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(.{{{MIN_TITLE_CHARS},120}}?)(?:\.|$)")));

/// Date cue patterns in priority order.
static DATE_PHRASES: LazyLock<[Regex; 6]> = LazyLock::new(|| {
    [
        compile(r"(?i)until\s+[^,.\n]+"),
        compile(r"(?i)by\s+[^,.\n]+"),
        compile(r"(?i)due\s+[^,.\n]+"),
        compile(r"(?i)in\s+\d+\s+days?"),
        compile(r"(?i)next\s+\w+"),
        compile(r"(?i)tomorrow|today"),
    ]
});

/// Keyword clusters and the label each contributes, in output order.
const LABEL_CLUSTERS: [(&[&str], &str); 4] = [
    (&["test", "testing", "qa", "verify"], "testing"),
    (&["docu", "readme", "docs"], "docs"),
    (&["bug", "fix", "error"], "bug"),
    (&["llm", "ai", "gpt", "agent"], "llm"),
];

/// Result of interpreting free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Short title derived from the text.
    pub title: String,
    /// The input text, verbatim.
    pub description: String,
    /// Labels guessed from keywords.
    pub labels: Vec<String>,
}

/// Derives title, description, and label hints from `text`.
#[must_use]
pub fn extract(text: &str) -> Extraction {
    Extraction {
        title: normalize_title(text),
        description: text.to_owned(),
        labels: guess_labels(text),
    }
}

/// Reduces a sentence or paragraph to a short task title.
///
/// Leading politeness, courtesy questions, and "add a task to my board"
/// scaffolding are removed, whitespace is collapsed, and the first sentence of
/// 10 to 120 characters is kept. Shorter text falls back to its first 80
/// characters.
///
/// # Examples
///
/// ```rust
/// use kanban_intake::intake::domain::normalize_title;
///
/// let title = normalize_title("Kindly: update the release notes. Thanks!");
/// assert_eq!(title, "update the release notes");
/// ```
#[must_use]
pub fn normalize_title(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let without_polite = POLITE_PREFIX.replace(trimmed, "");
    let without_courtesy = COURTESY_PREFIX.replace(&without_polite, "");
    let without_scaffold = SCAFFOLD_PREFIX.replace(&without_courtesy, "");
    let collapsed = WHITESPACE_RUN.replace_all(&without_scaffold, " ");
    let first_line = collapsed.trim().lines().next().unwrap_or_default().trim();

    TITLE_CANDIDATE
        .captures(first_line)
        .and_then(|captures| captures.get(1))
        .map_or_else(
            || {
                first_line
                    .chars()
                    .take(FALLBACK_TITLE_CHARS)
                    .collect::<String>()
                    .trim()
                    .to_owned()
            },
            |candidate| candidate.as_str().trim().to_owned(),
        )
}

/// Finds the phrase in `text` that most likely names a due date.
///
/// "end of (the) next week" yields the [`END_OF_NEXT_WEEK`] sentinel;
/// otherwise the first match of `until …`, `by …`, `due …`, `in N days`,
/// `next <word>`, or `tomorrow`/`today` is returned verbatim.
#[must_use]
pub fn extract_date_phrase(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if lower.contains("end of next week") || lower.contains("end of the next week") {
        return Some(END_OF_NEXT_WEEK.to_owned());
    }

    DATE_PHRASES
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|found| found.as_str().to_owned())
}

/// Guesses labels from keyword clusters; each cluster adds at most one label.
#[must_use]
pub fn guess_labels(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    LABEL_CLUSTERS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(*keyword)))
        .map(|(_, label)| (*label).to_owned())
        .collect()
}
