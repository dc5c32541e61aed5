//! Suggestion Parser — extracts structured suggestions from a freeform
//! advisory response.
//!
//! The model's output shape is not contractually guaranteed, so this is a
//! best-effort heuristic: any line without the pipe delimiter is noise, a
//! completely unparseable response yields an empty list, and nothing here
//! ever returns an error.

use serde::{Deserialize, Serialize};

/// Hard cap on returned records.
pub const MAX_SUGGESTIONS: usize = 3;

const DELIMITER: char = '|';

/// Confidence keywords scanned for (and stripped from action labels) when no
/// explicit confidence column is present. Order is match priority.
const CONFIDENCE_KEYWORDS: [&str; 3] = ["High", "Medium", "Low"];

/// Confidence label attached to a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    Unknown,
}

impl Confidence {
    /// Maps a raw column value onto the enumeration. Unrecognized labels are
    /// `Unknown` rather than an error.
    fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            "low" => Confidence::Low,
            _ => Confidence::Unknown,
        }
    }
}

/// One heuristically extracted suggestion.
/// The action label doubles as the deduplication key — the first occurrence
/// of a given action wins and later duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub action: String,
    pub reason: String,
    pub confidence: Confidence,
}

/// Knobs the original call sites disagreed on, surfaced as configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Minimum length of an action label, in characters. Shorter actions are
    /// discarded as noise.
    pub min_action_len: usize,
    /// When set, lines must carry an explicit third (confidence) column;
    /// two-column lines are discarded instead of inferring confidence.
    pub require_confidence: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            min_action_len: 3,
            require_confidence: false,
        }
    }
}

/// Parses an advisory response into at most [`MAX_SUGGESTIONS`] records,
/// case-preserved, in order of first appearance.
///
/// Delimiter presence is the sole structural signal: there is no quoting or
/// escaping, and every non-conforming line is silently discarded.
pub fn parse_suggestions(raw_text: &str, options: &ParserOptions) -> Vec<SuggestionRecord> {
    let mut records: Vec<SuggestionRecord> = Vec::new();

    for line in raw_text.lines() {
        if !line.contains(DELIMITER) {
            continue;
        }

        let columns: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if columns.len() < 2 || (options.require_confidence && columns.len() < 3) {
            continue;
        }

        let action_raw = strip_bullet_glyphs(columns[0]);
        let reason = columns[1];

        if is_header_row(action_raw, &columns) {
            continue;
        }
        if action_raw.chars().count() < options.min_action_len {
            continue;
        }

        // Explicit third column wins; otherwise infer from the line's text and
        // strip the keyword from the displayed label.
        let (action, confidence) = match columns.get(2) {
            Some(raw) => (action_raw.to_string(), Confidence::from_label(raw)),
            None => infer_confidence(action_raw, reason),
        };

        if !action.chars().any(char::is_alphanumeric) {
            continue;
        }
        if records.iter().any(|r| r.action == action) {
            continue;
        }

        records.push(SuggestionRecord {
            action,
            reason: reason.to_string(),
            confidence,
        });
        if records.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    records
}

/// Strips leading bullet glyphs (hyphen, bullet dot) from an action column.
fn strip_bullet_glyphs(column: &str) -> &str {
    column.trim_start_matches(['-', '•', ' ']).trim()
}

/// Detects a repeated header row: the action column reads "action"/"actions",
/// or the line carries both "Action" and "Reason" as column headers.
fn is_header_row(action: &str, columns: &[&str]) -> bool {
    if action.eq_ignore_ascii_case("action") || action.eq_ignore_ascii_case("actions") {
        return true;
    }
    let has_header = |word: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(word));
    (has_header("action") || has_header("actions")) && has_header("reason")
}

/// Scans the action and reason text for literal confidence keywords.
///
/// The first keyword (in High/Medium/Low priority) wins; text with no keyword
/// defaults to Medium. Keyword occurrences are stripped out of the displayed
/// action label. The strip is literal and hits every occurrence, even when
/// the word is part of a longer phrase — a known heuristic kept for
/// compatibility, not a correctness guarantee.
fn infer_confidence(action: &str, reason: &str) -> (String, Confidence) {
    let haystack = format!("{action} {reason}");
    let confidence = CONFIDENCE_KEYWORDS
        .iter()
        .find(|keyword| haystack.contains(*keyword))
        .map(|keyword| Confidence::from_label(keyword))
        .unwrap_or(Confidence::Medium);

    let mut label = action.to_string();
    for keyword in CONFIDENCE_KEYWORDS {
        label = label.replace(keyword, "");
    }

    (label.trim().to_string(), confidence)
}
