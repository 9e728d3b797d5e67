//! 类型系统模块：定义 VQA 请求、响应与服务端点等核心数据类型。
//!
//! # Types Module
//!
//! Core value types that travel between the calling layer, the codec and the
//! client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`VqaRequest`] | Image bytes + question text (+ optional metadata) |
//! | [`VqaResponse`] | Comma-separated candidate answers returned by the server |
//! | [`Endpoint`] | `(host, port)` of the inference server |
//!
//! ## Example
//!
//! ```rust
//! use vqa_client::types::{Endpoint, VqaRequest};
//!
//! let request = VqaRequest::new(vec![0xFF, 0xD8, 0xFF], "what color is the car");
//! assert_eq!(request.question, "what color is the car");
//!
//! let endpoint = Endpoint::new("10.0.0.7", 8888);
//! assert_eq!(endpoint.to_string(), "10.0.0.7:8888");
//! ```

pub mod endpoint;
pub mod message;

pub use endpoint::Endpoint;
pub use message::{Metadata, VqaRequest, VqaResponse};
