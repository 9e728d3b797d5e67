//! # vqa-client
//!
//! 视觉问答（VQA）服务的弹性客户端：长度前缀帧传输、发送重试与自动重连，以及面向语音助手的答案格式化。
//!
//! Resilient client for a visual question answering server reached over a
//! persistent TCP socket.
//!
//! ## Overview
//!
//! A question and an image are encoded as one JSON document, sent as a single
//! length-prefixed frame, and answered by exactly one frame carrying the
//! server's comma-separated candidates. Sends are retried with reconnects up
//! to a configurable budget; receive and decode failures reset the connection
//! and are reported once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vqa_client::{format_answer, VqaClientBuilder};
//! use vqa_client::types::VqaRequest;
//!
//! #[tokio::main]
//! async fn main() -> vqa_client::Result<()> {
//!     let mut client = VqaClientBuilder::new()
//!         .host("192.168.43.243")
//!         .port(8888)
//!         .build()?;
//!
//!     let image = std::fs::read("photo.jpg")?;
//!     let response = client
//!         .query(&VqaRequest::new(image, "what color is the car"))
//!         .await?;
//!     println!("{}", format_answer(&response.result));
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transport`] | Length-prefixed framing and the TCP connection |
//! | [`codec`] | JSON payload encoding and decoding |
//! | [`client`] | Retrying client, builder and shared handle |
//! | [`formatter`] | Candidate list to spoken phrase |
//! | [`skill`] | Voice-assistant calling layer |
//! | [`config`] | File, settings and environment configuration |
//! | [`types`] | Request, response and endpoint types |

pub mod client;
pub mod codec;
pub mod config;
pub mod formatter;
pub mod skill;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{RetryPolicy, SharedVqaClient, VqaClient, VqaClientBuilder};
pub use config::ClientConfig;
pub use formatter::{format_answer, AnswerFormatter};
pub use skill::{AnswerOutcome, IntentEvent, QuestionAnsweringSkill};
pub use types::{Endpoint, VqaRequest, VqaResponse};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, FailureCause, FailureKind};
