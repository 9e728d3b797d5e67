//! Length-prefixed framing.
//!
//! Each frame is a 4-byte big-endian payload length followed by the payload
//! bytes: `[u32 length][payload]`. The payload is opaque here; it may contain
//! any byte values, including ones equal to the prefix encoding.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use super::TransportError;

/// Largest frame accepted in either direction unless configured otherwise.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Frame codec for `tokio_util::codec::Framed`.
///
/// Delegates to [`LengthDelimitedCodec`] but reports a stream that ends in
/// the middle of a frame as [`TransportError::ConnectionClosed`] instead of a
/// generic I/O error.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    inner: LengthDelimitedCodec,
    max_frame_length: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::with_max_frame_length(DEFAULT_MAX_FRAME_LENGTH)
    }

    pub fn with_max_frame_length(max_frame_length: usize) -> Self {
        let inner = LengthDelimitedCodec::builder()
            .length_field_length(4)
            .big_endian()
            .max_frame_length(max_frame_length)
            .new_codec();
        Self {
            inner,
            max_frame_length,
        }
    }

    pub fn max_frame_length(&self) -> usize {
        self.max_frame_length
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, TransportError> {
        Ok(self.inner.decode(src)?.map(BytesMut::freeze))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, TransportError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(TransportError::ConnectionClosed {
                buffered: src.len(),
            }),
        }
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), TransportError> {
        if item.len() > self.max_frame_length {
            return Err(TransportError::FrameTooLarge {
                len: item.len(),
                max: self.max_frame_length,
            });
        }
        self.inner.encode(item, dst)?;
        Ok(())
    }
}
