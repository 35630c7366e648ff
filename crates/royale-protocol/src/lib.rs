//! Wire protocol for ChatRoyale.
//!
//! This crate defines the "language" the game server speaks to the client:
//!
//! - **Types** ([`ServerMessage`], [`RoundRules`], [`Nonce`]): the frames
//!   that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames are converted
//!   to/from bytes.
//! - **Decoder** ([`FrameDecoder`]): turns one raw text frame into a typed
//!   [`GameEvent`], never failing outright.
//!
//! ```text
//! Transport (text) → Protocol (GameEvent) → State (GameState)
//! ```

mod codec;
mod error;
mod event;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{DecodeStats, FrameDecoder, GameEvent};
pub use types::{Nonce, RoundRules, ServerMessage};
