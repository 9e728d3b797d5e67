//! Question extraction from intent events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keyword stripped from free utterances ("question what is this").
const TRIGGER_WORD: &str = "question";

/// Slots delivered by the voice framework with a VQA intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentEvent {
    #[serde(rename = "Question", default)]
    pub question: Option<String>,
    #[serde(rename = "Sentence", default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub utterance: Option<String>,
}

impl IntentEvent {
    pub fn from_utterance(utterance: impl Into<String>) -> Self {
        Self {
            utterance: Some(utterance.into()),
            ..Self::default()
        }
    }

    /// Read the slots out of the framework's message data. Non-string slot
    /// values are ignored.
    pub fn from_data(data: &Map<String, Value>) -> Self {
        let slot = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            question: slot("Question"),
            sentence: slot("Sentence"),
            utterance: slot("utterance"),
        }
    }

    /// The normalized question, preferring the `Question` slot, then
    /// `Sentence`, then the raw utterance minus the trigger word.
    pub fn question_text(&self) -> Option<String> {
        let from_slot = [&self.question, &self.sentence]
            .into_iter()
            .flatten()
            .map(|s| normalize_question(s))
            .find(|q| !q.is_empty());
        from_slot.or_else(|| {
            self.utterance
                .as_deref()
                .map(|u| normalize_question(&u.to_lowercase().replace(TRIGGER_WORD, " ")))
                .filter(|q| !q.is_empty())
        })
    }
}

/// Lower-case, drop punctuation (apostrophes stay), collapse whitespace.
pub fn normalize_question(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_question("  What's   THIS?! "), "what's this");
        assert_eq!(normalize_question("is it red, or blue?"), "is it red or blue");
        assert_eq!(normalize_question("...?"), "");
    }

    #[test]
    fn test_slot_precedence() {
        let event = IntentEvent {
            question: Some("How many cars?".into()),
            sentence: Some("ignored".into()),
            utterance: Some("question ignored too".into()),
        };
        assert_eq!(event.question_text().as_deref(), Some("how many cars"));

        let event = IntentEvent {
            question: Some("  ".into()),
            sentence: Some("Is the door open".into()),
            utterance: None,
        };
        assert_eq!(event.question_text().as_deref(), Some("is the door open"));
    }

    #[test]
    fn test_utterance_trigger_word_removed() {
        let event = IntentEvent::from_utterance("Question what color is the car");
        assert_eq!(event.question_text().as_deref(), Some("what color is the car"));

        let event = IntentEvent::from_utterance("question");
        assert_eq!(event.question_text(), None);
    }

    #[test]
    fn test_from_data() {
        let data = json!({
            "Sentence": "what is it",
            "Question": 5,
            "utterance": "question what is it"
        });
        let event = IntentEvent::from_data(data.as_object().unwrap());
        assert_eq!(event.question, None);
        assert_eq!(event.sentence.as_deref(), Some("what is it"));
        assert_eq!(event.utterance.as_deref(), Some("question what is it"));
    }

    #[test]
    fn test_deserialize_slots() {
        let event: IntentEvent =
            serde_json::from_value(json!({"Question": "what is that"})).unwrap();
        assert_eq!(event.question.as_deref(), Some("what is that"));
        assert!(event.utterance.is_none());
    }
}
