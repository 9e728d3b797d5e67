//! Skill-level flow: intent in, spoken dialog out, over a real socket.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use common::mock_server::{unused_endpoint, Behavior, MockServerFixture};
use serde_json::{json, Map, Value};
use vqa_client::skill::{
    Camera, CapturedImage, DialogSink, ImageMetadata, SpeechToText, DIALOG_CONNECTION_ERROR,
    DIALOG_NO_QUESTION, DIALOG_RESULT, DIALOG_UNKNOWN_ERROR,
};
use vqa_client::types::Endpoint;
use vqa_client::{
    AnswerFormatter, AnswerOutcome, IntentEvent, QuestionAnsweringSkill, VqaClientBuilder,
};

struct StaticCamera;

#[async_trait]
impl Camera for StaticCamera {
    async fn take_image(&self) -> anyhow::Result<CapturedImage> {
        Ok(CapturedImage {
            bytes: Bytes::from(vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x10]),
            metadata: ImageMetadata {
                width: 1280,
                height: 720,
                format: "jpeg".into(),
            },
        })
    }
}

/// Speech recognizer that returns a scripted phrase, or fails when empty.
struct ScriptedStt(Option<&'static str>);

#[async_trait]
impl SpeechToText for ScriptedStt {
    async fn get_phrase(&self) -> anyhow::Result<String> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("timeout waiting for speech"))
    }
}

#[derive(Clone, Default)]
struct DialogLog(Arc<Mutex<Vec<(String, Map<String, Value>)>>>);

#[async_trait]
impl DialogSink for DialogLog {
    async fn speak_dialog(&self, dialog: &str, data: &Map<String, Value>) {
        self.0.lock().unwrap().push((dialog.to_string(), data.clone()));
    }
}

impl DialogLog {
    fn last(&self) -> (String, Map<String, Value>) {
        self.0.lock().unwrap().last().cloned().expect("something was spoken")
    }
}

fn skill_for(
    endpoint: &Endpoint,
    stt: ScriptedStt,
    dialog: DialogLog,
) -> QuestionAnsweringSkill<StaticCamera, ScriptedStt, DialogLog> {
    let client = VqaClientBuilder::new()
        .host(endpoint.host.clone())
        .port(endpoint.port)
        .build()
        .expect("valid config");
    QuestionAnsweringSkill::new(client, StaticCamera, stt, dialog)
}

#[tokio::test]
async fn test_question_slot_is_answered() {
    let server = MockServerFixture::start(Behavior::Answer("three, four, 5".into())).await;
    let dialog = DialogLog::default();
    let mut skill = skill_for(&server.endpoint, ScriptedStt(None), dialog.clone());
    skill.initialize().await;

    let data = json!({"Question": "How many cups are on the table?"});
    let event = IntentEvent::from_data(data.as_object().unwrap());
    let outcome = skill.answer(&event).await;

    assert_eq!(outcome, AnswerOutcome::Answered("Three Four or 5 ".into()));
    let (name, data) = dialog.last();
    assert_eq!(name, DIALOG_RESULT);
    assert_eq!(data.get("result"), Some(&json!("Three Four or 5 ")));

    let received = server.requests();
    assert_eq!(received[0].question, "how many cups are on the table");
    assert_eq!(received[0].image.len(), 6);
    skill.shutdown().await;
}

#[tokio::test]
async fn test_stt_fallback_and_pause_marker() {
    let server = MockServerFixture::start(Behavior::Answer("cat, dog".into())).await;
    let dialog = DialogLog::default();
    let stt = ScriptedStt(Some("What Animal IS this"));
    let mut skill = skill_for(&server.endpoint, stt, dialog.clone())
        .with_formatter(AnswerFormatter::with_marker(" . "));

    let outcome = skill.answer(&IntentEvent::default()).await;
    assert_eq!(outcome, AnswerOutcome::Answered("Cat . or Dog . ".into()));
    assert_eq!(server.requests()[0].question, "what animal is this");
}

#[tokio::test]
async fn test_no_question_heard() {
    let server = MockServerFixture::start(Behavior::Answer("unused".into())).await;
    let dialog = DialogLog::default();
    let mut skill = skill_for(&server.endpoint, ScriptedStt(Some("  ?! ")), dialog.clone());

    assert_eq!(skill.answer(&IntentEvent::default()).await, AnswerOutcome::NoQuestion);
    assert_eq!(dialog.last().0, DIALOG_NO_QUESTION);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_server_down_speaks_connection_error() {
    let endpoint = unused_endpoint().await;
    let dialog = DialogLog::default();
    let mut skill = skill_for(&endpoint, ScriptedStt(None), dialog.clone());
    skill.initialize().await;

    let outcome = skill
        .answer(&IntentEvent::from_utterance("question what is this"))
        .await;
    assert_eq!(outcome, AnswerOutcome::ConnectionError);
    assert_eq!(dialog.last().0, DIALOG_CONNECTION_ERROR);
}

#[tokio::test]
async fn test_garbage_reply_speaks_unknown_error() {
    let server = MockServerFixture::start(Behavior::Garbage).await;
    let dialog = DialogLog::default();
    let mut skill = skill_for(&server.endpoint, ScriptedStt(None), dialog.clone());

    let outcome = skill
        .answer(&IntentEvent::from_utterance("what is this"))
        .await;
    assert_eq!(outcome, AnswerOutcome::UnknownError);
    assert_eq!(dialog.last().0, DIALOG_UNKNOWN_ERROR);
    assert!(skill.client().is_connected());
}
