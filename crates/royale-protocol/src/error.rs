//! Error types for the protocol layer.
//!
//! These never escape the decoder:
//! [`FrameDecoder::decode`](crate::FrameDecoder::decode) turns every
//! `ProtocolError` into a `DecodeFailure` event. They are public so callers
//! using the [`Codec`](crate::Codec) directly (tests, tooling) get a typed
//! error.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Deserialization failed: not JSON, no `type` field, or a known
    /// `type` whose fields have the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but is not a valid protocol message.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
