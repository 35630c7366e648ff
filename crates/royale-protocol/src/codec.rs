//! Codec trait and implementations for deserializing frames.
//!
//! A codec turns raw bytes into Rust types. The decoder doesn't care HOW
//! frames are serialized; it just needs something that implements the
//! [`Codec`] trait. The client only ever reads from the server, so there is
//! no encode side. The game server speaks JSON today, so [`JsonCodec`] is
//! the only implementation.

use serde::de::DeserializeOwned;

use crate::ProtocolError;

/// A codec that decodes bytes into Rust types.
///
/// `Send + Sync + 'static` because the codec lives inside the client actor,
/// which runs as a spawned Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use royale_protocol::{Codec, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
///
/// let decoded: ServerMessage = codec
///     .decode(br#"{"type":"ADD_PLAYER","player":"Ana"}"#)
///     .unwrap();
/// assert_eq!(decoded, ServerMessage::AddPlayer { player: "Ana".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
