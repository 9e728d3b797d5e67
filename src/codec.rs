//! 消息编解码：将 VQA 请求编码为 JSON 帧载荷，并将服务端响应解码为结构化结果。
//!
//! Message codec.
//!
//! One frame carries one JSON object. Requests look like
//! `{"image": "<base64>", "metadata": {...}, "question": "..."}` and responses
//! like `{"result": "red, blue"}`. Object keys are emitted in sorted order, so
//! encoding the same request twice yields identical bytes.

use base64::Engine as _;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::types::{VqaRequest, VqaResponse};

const FIELD_IMAGE: &str = "image";
const FIELD_QUESTION: &str = "question";
const FIELD_METADATA: &str = "metadata";
const FIELD_RESULT: &str = "result";

/// Errors raised while decoding a frame payload.
///
/// Every variant means the peer sent a malformed message.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed message: invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("malformed message: expected a JSON object")]
    NotAnObject,

    /// The field is absent or has the wrong JSON type.
    #[error("malformed message: missing or invalid field `{0}`")]
    MissingField(&'static str),

    #[error("malformed message: image is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),
}

/// Stateless JSON codec for VQA messages.
pub struct MessageCodec;

impl MessageCodec {
    /// Encode a request into a frame payload.
    pub fn encode(request: &VqaRequest) -> Bytes {
        let mut obj = Map::new();
        obj.insert(
            FIELD_IMAGE.to_string(),
            Value::String(base64::engine::general_purpose::STANDARD.encode(&request.image)),
        );
        obj.insert(
            FIELD_QUESTION.to_string(),
            Value::String(request.question.clone()),
        );
        if let Some(meta) = &request.metadata {
            obj.insert(FIELD_METADATA.to_string(), Value::Object(meta.clone()));
        }
        Bytes::from(Value::Object(obj).to_string())
    }

    /// Decode a response payload. Fields other than `result` are kept in `extra`.
    pub fn decode(payload: &[u8]) -> Result<VqaResponse, CodecError> {
        let mut obj = Self::parse_object(payload)?;
        match obj.remove(FIELD_RESULT) {
            Some(Value::String(result)) => Ok(VqaResponse { result, extra: obj }),
            _ => Err(CodecError::MissingField(FIELD_RESULT)),
        }
    }

    /// Server-side counterpart of [`MessageCodec::encode`].
    pub fn decode_request(payload: &[u8]) -> Result<VqaRequest, CodecError> {
        let mut obj = Self::parse_object(payload)?;
        let image = match obj.remove(FIELD_IMAGE) {
            Some(Value::String(b64)) => base64::engine::general_purpose::STANDARD.decode(b64)?,
            _ => return Err(CodecError::MissingField(FIELD_IMAGE)),
        };
        let question = match obj.remove(FIELD_QUESTION) {
            Some(Value::String(q)) => q,
            _ => return Err(CodecError::MissingField(FIELD_QUESTION)),
        };
        let metadata = match obj.remove(FIELD_METADATA) {
            None | Some(Value::Null) => None,
            Some(Value::Object(meta)) => Some(meta),
            Some(_) => return Err(CodecError::MissingField(FIELD_METADATA)),
        };
        Ok(VqaRequest {
            image: Bytes::from(image),
            question,
            metadata,
        })
    }

    /// Server-side counterpart of [`MessageCodec::decode`].
    pub fn encode_response(response: &VqaResponse) -> Bytes {
        let mut obj = response.extra.clone();
        obj.insert(
            FIELD_RESULT.to_string(),
            Value::String(response.result.clone()),
        );
        Bytes::from(Value::Object(obj).to_string())
    }

    fn parse_object(payload: &[u8]) -> Result<Map<String, Value>, CodecError> {
        match serde_json::from_slice::<Value>(payload)? {
            Value::Object(obj) => Ok(obj),
            _ => Err(CodecError::NotAnObject),
        }
    }
}
