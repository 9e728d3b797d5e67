//! 答案格式化：将服务端返回的逗号分隔候选答案转换为可朗读的短语。
//!
//! Turns the server's comma-separated candidates into a phrase for the speech
//! layer. Candidates are emitted in order until one is definitive: a candidate
//! containing a digit, or exactly `Yes` / `No` after capitalization.

/// Default marker appended after each candidate.
pub const DEFAULT_MARKER: &str = " ";

/// Phrase builder with a configurable terminating marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFormatter {
    marker: String,
}

impl AnswerFormatter {
    pub fn new() -> Self {
        Self::with_marker(DEFAULT_MARKER)
    }

    /// `with_marker(" . ")` inserts a spoken pause after each candidate.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn format(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let answers: Vec<String> = raw.split(',').map(|a| capitalize(a.trim())).collect();
        let count = answers.len();
        let mut phrase = String::new();
        for (i, answer) in answers.iter().enumerate() {
            phrase.push_str(answer);
            phrase.push_str(&self.marker);
            if is_definitive(answer) {
                break;
            }
            if count > 1 && i == count - 2 {
                phrase.push_str("or ");
            }
        }
        phrase
    }
}

impl Default for AnswerFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format with the default marker.
pub fn format_answer(raw: &str) -> String {
    AnswerFormatter::new().format(raw)
}

/// Uppercase the first character, leave the rest untouched.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_definitive(answer: &str) -> bool {
    answer.chars().any(char::is_numeric) || answer == "Yes" || answer == "No"
}
