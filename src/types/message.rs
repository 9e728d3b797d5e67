//! Request and response messages exchanged with the VQA server.

use bytes::Bytes;
use serde_json::{Map, Value};

/// Free-form metadata attached to a request.
pub type Metadata = Map<String, Value>;

/// One visual question: the captured image and the normalized question text.
#[derive(Debug, Clone, PartialEq)]
pub struct VqaRequest {
    /// Raw image bytes as produced by the camera (typically JPEG).
    pub image: Bytes,
    pub question: String,
    pub metadata: Option<Metadata>,
}

impl VqaRequest {
    pub fn new(image: impl Into<Bytes>, question: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            question: question.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Answer returned by the server for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VqaResponse {
    /// Comma-separated list of candidate answers, best first.
    pub result: String,
    /// Any other fields the server chose to include.
    pub extra: Map<String, Value>,
}

impl VqaResponse {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            extra: Map::new(),
        }
    }

    /// Candidate answers in server order, trimmed, empty entries skipped.
    pub fn candidates(&self) -> Vec<&str> {
        self.result
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_skip_blank_entries() {
        let resp = VqaResponse::new(" red , ,blue,");
        assert_eq!(resp.candidates(), vec!["red", "blue"]);
    }

    #[test]
    fn test_request_metadata_builder() {
        let mut meta = Metadata::new();
        meta.insert("width".to_string(), Value::from(800));
        let req = VqaRequest::new(Vec::<u8>::new(), "is it raining").with_metadata(meta);
        assert!(req.image.is_empty());
        assert_eq!(
            req.metadata.as_ref().and_then(|m| m.get("width")),
            Some(&Value::from(800))
        );
    }
}
