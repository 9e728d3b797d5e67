//! 语音技能调用层：从意图事件中提取问题、拍照、查询 VQA 服务并朗读结果。
//!
//! Calling layer between a voice-assistant framework and [`VqaClient`].
//!
//! [`QuestionAnsweringSkill::answer`] never fails: every outcome, including
//! errors, is turned into a spoken dialog.
//!
//! | Outcome | Dialog |
//! |---------|--------|
//! | answer received | `Result` with `{"result": <phrase>}` |
//! | server unreachable | `ConnectionError` |
//! | no question heard | `NoQuestion` |
//! | anything else | `UnknownError`, then a reconnect |

pub mod collaborators;
pub mod intent;

pub use collaborators::{Camera, CapturedImage, DialogSink, ImageMetadata, SpeechToText};
pub use intent::{normalize_question, IntentEvent};

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::client::VqaClient;
use crate::error::{FailureCause, FailureKind};
use crate::formatter::AnswerFormatter;
use crate::transport::{Connector, TcpConnector};
use crate::types::VqaRequest;
use crate::{Error, ErrorContext, Result};

pub const DIALOG_RESULT: &str = "Result";
pub const DIALOG_CONNECTION_ERROR: &str = "ConnectionError";
pub const DIALOG_NO_QUESTION: &str = "NoQuestion";
pub const DIALOG_UNKNOWN_ERROR: &str = "UnknownError";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The spoken phrase.
    Answered(String),
    ConnectionError,
    NoQuestion,
    UnknownError,
}

pub struct QuestionAnsweringSkill<Cam, Stt, D, C: Connector = TcpConnector> {
    client: VqaClient<C>,
    camera: Cam,
    stt: Stt,
    dialog: D,
    formatter: AnswerFormatter,
}

impl<Cam, Stt, D, C> QuestionAnsweringSkill<Cam, Stt, D, C>
where
    Cam: Camera,
    Stt: SpeechToText,
    D: DialogSink,
    C: Connector,
{
    pub fn new(client: VqaClient<C>, camera: Cam, stt: Stt, dialog: D) -> Self {
        Self {
            client,
            camera,
            stt,
            dialog,
            formatter: AnswerFormatter::new(),
        }
    }

    pub fn with_formatter(mut self, formatter: AnswerFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn client(&self) -> &VqaClient<C> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut VqaClient<C> {
        &mut self.client
    }

    /// Connect eagerly at start-up. A failure is logged; the first query
    /// will try again.
    pub async fn initialize(&mut self) {
        info!(endpoint = %self.client.endpoint(), "question answering skill started");
        if let Err(e) = self.client.connect().await {
            warn!(error = %e, "initial connect failed");
        }
    }

    /// Handle one VQA intent.
    pub async fn answer(&mut self, event: &IntentEvent) -> AnswerOutcome {
        let err = match self.try_answer(event).await {
            Ok(phrase) => {
                let mut data = Map::new();
                data.insert("result".to_string(), Value::String(phrase.clone()));
                self.dialog.speak_dialog(DIALOG_RESULT, &data).await;
                return AnswerOutcome::Answered(phrase);
            }
            Err(err) => err,
        };

        let empty = Map::new();
        match err.kind() {
            FailureKind::ConnectionFailure => {
                self.dialog.speak_dialog(DIALOG_CONNECTION_ERROR, &empty).await;
                AnswerOutcome::ConnectionError
            }
            FailureKind::NoQuestion => {
                self.dialog.speak_dialog(DIALOG_NO_QUESTION, &empty).await;
                AnswerOutcome::NoQuestion
            }
            FailureKind::MalformedResponse | FailureKind::Unknown => {
                warn!(error = %err, "question answering failed");
                self.dialog.speak_dialog(DIALOG_UNKNOWN_ERROR, &empty).await;
                // Failures raised inside `query` have already reset the connection.
                if !raised_by_query(&err) {
                    self.client.reconnect().await;
                }
                AnswerOutcome::UnknownError
            }
        }
    }

    /// Close the connection. Best effort.
    pub async fn shutdown(&mut self) {
        self.client.close().await;
        info!("question answering skill closed");
    }

    async fn try_answer(&mut self, event: &IntentEvent) -> Result<String> {
        let question = self.resolve_question(event).await?;

        let image = self.camera.take_image().await.map_err(|e| {
            Error::unknown_with_context(
                "camera capture failed",
                FailureCause::Collaborator(e.to_string()),
                ErrorContext::new().with_source("camera"),
            )
        })?;

        info!(question = question.as_str(), "sending question");
        let request = VqaRequest::new(image.bytes, question);
        let response = self.client.query(&request).await?;
        Ok(self.formatter.format(&response.result))
    }

    async fn resolve_question(&self, event: &IntentEvent) -> Result<String> {
        if let Some(question) = event.question_text() {
            return Ok(question);
        }
        match self.stt.get_phrase().await {
            Ok(phrase) => {
                let question = normalize_question(&phrase);
                if question.is_empty() {
                    Err(Error::no_question(
                        ErrorContext::new()
                            .with_source("speech_to_text")
                            .with_details("empty transcription"),
                    ))
                } else {
                    Ok(question)
                }
            }
            Err(e) => Err(Error::no_question(
                ErrorContext::new()
                    .with_source("speech_to_text")
                    .with_details(e.to_string()),
            )),
        }
    }
}

fn raised_by_query(err: &Error) -> bool {
    matches!(
        err,
        Error::Unknown {
            cause: FailureCause::Transport(_) | FailureCause::Codec(_),
            ..
        }
    )
}
