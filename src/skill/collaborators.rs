//! Host-side collaborators the skill depends on. Implementations live in the
//! embedding application (camera driver, speech recognizer, voice framework).

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};

/// Capture parameters reported alongside an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// e.g. `"jpeg"`
    pub format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub bytes: Bytes,
    pub metadata: ImageMetadata,
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn take_image(&self) -> anyhow::Result<CapturedImage>;
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Listen for one phrase. Fails when nothing intelligible was heard.
    async fn get_phrase(&self) -> anyhow::Result<String>;
}

#[async_trait]
pub trait DialogSink: Send + Sync {
    /// Speak the named dialog, filling its template from `data`.
    async fn speak_dialog(&self, dialog: &str, data: &Map<String, Value>);
}
