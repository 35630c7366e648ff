//! Wire types: what the game server sends, and the round rules it carries.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Nonce
// ---------------------------------------------------------------------------

/// Opaque token identifying one round's rules.
///
/// Two `ROUND_START` frames with the same nonce describe the same round
/// (rules re-sent); a different nonce means a new round. The countdown only
/// restarts on a new nonce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(String);

impl Nonce {
    /// Wraps a server-supplied token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mints a fresh random 32-character hex token (128 bits).
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the empty token carried by default rules.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RoundRules
// ---------------------------------------------------------------------------

/// The rules of the current round, replaced wholesale on every round start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRules {
    /// What players have to type, e.g. "Name a fruit".
    pub prompt: String,
    /// Whether two players may give the same answer.
    pub duplicates_allowed: bool,
    /// Length of the round in seconds.
    pub timer_seconds: i64,
    pub nonce: Nonce,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            duplicates_allowed: false,
            timer_seconds: 99,
            nonce: Nonce::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage (one inbound frame)
// ---------------------------------------------------------------------------

/// A frame sent by the game server.
///
/// `#[serde(tag = "type")]` makes this an internally tagged enum, so
/// `AddPlayer { player: "Ana" }` arrives as
/// `{"type":"ADD_PLAYER","player":"Ana"}`. A frame without a `type` field
/// fails to deserialize; a frame whose `type` is not listed here lands in
/// [`ServerMessage::Unknown`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Full roster snapshot plus the numeric game phase.
    State {
        players: Vec<String>,
        losers: Vec<String>,
        #[serde(rename = "gameState")]
        game_state: i64,
    },

    AddPlayer { player: String },

    PlayerLost { player: String },

    /// New round rules. Older servers omit `nonce`.
    RoundStart {
        prompt: String,
        #[serde(rename = "duplicatesAllowed")]
        duplicates_allowed: bool,
        /// Round length in seconds.
        time: i64,
        #[serde(default)]
        nonce: Option<Nonce>,
    },

    /// The round finished; `winner` is only meaningful when the next phase
    /// is the end of the game.
    RoundEnd {
        #[serde(rename = "nextState")]
        next_state: i64,
        #[serde(default)]
        winner: Option<String>,
    },

    /// Any `type` this client does not understand.
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// The wire name of this frame's `type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::State { .. } => "STATE",
            Self::AddPlayer { .. } => "ADD_PLAYER",
            Self::PlayerLost { .. } => "PLAYER_LOST",
            Self::RoundStart { .. } => "ROUND_START",
            Self::RoundEnd { .. } => "ROUND_END",
            Self::Unknown => "UNKNOWN",
        }
    }
}
