//! Domain events and the frame decoder that produces them.

use crate::{Codec, Nonce, ProtocolError, RoundRules, ServerMessage};

/// A decoded, typed game event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Full replacement of players and losers, plus the numeric phase.
    Snapshot {
        players: Vec<String>,
        losers: Vec<String>,
        phase: i64,
    },
    PlayerAdded { name: String },
    PlayerLost { name: String },
    /// New round rules, always carrying a nonce.
    RoundStart(RoundRules),
    RoundEnd {
        next_phase: i64,
        winner: Option<String>,
    },
    /// The frame could not be decoded. `raw` is kept for logging.
    DecodeFailure { raw: String, reason: String },
}

impl GameEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "Snapshot",
            Self::PlayerAdded { .. } => "PlayerAdded",
            Self::PlayerLost { .. } => "PlayerLost",
            Self::RoundStart(_) => "RoundStart",
            Self::RoundEnd { .. } => "RoundEnd",
            Self::DecodeFailure { .. } => "DecodeFailure",
        }
    }
}

impl ServerMessage {
    /// Rejects frames that deserialize but make no sense to the game.
    fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::AddPlayer { player } | Self::PlayerLost { player } if player.trim().is_empty() => {
                Err(ProtocolError::InvalidMessage(format!(
                    "{} with an empty player name",
                    self.type_name()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Maps a frame to its event. `Unknown` maps to nothing.
    fn into_event(self) -> Option<GameEvent> {
        let event = match self {
            Self::State {
                players,
                losers,
                game_state,
            } => GameEvent::Snapshot {
                players,
                losers,
                phase: game_state,
            },
            Self::AddPlayer { player } => GameEvent::PlayerAdded { name: player },
            Self::PlayerLost { player } => GameEvent::PlayerLost { name: player },
            Self::RoundStart {
                prompt,
                duplicates_allowed,
                time,
                nonce,
            } => GameEvent::RoundStart(RoundRules {
                prompt,
                duplicates_allowed,
                timer_seconds: time,
                // Servers that omit the nonce get one per frame, so every
                // such ROUND_START counts as a new round.
                nonce: nonce
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(Nonce::generate),
            }),
            Self::RoundEnd { next_state, winner } => GameEvent::RoundEnd {
                next_phase: next_state,
                winner,
            },
            Self::Unknown => return None,
        };
        Some(event)
    }
}

// ---------------------------------------------------------------------------
// FrameDecoder
// ---------------------------------------------------------------------------

/// Running totals kept by a [`FrameDecoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Frames that produced a game event.
    pub decoded: u64,
    /// Frames that produced a `DecodeFailure`.
    pub failed: u64,
    /// Frames dropped because their `type` is not recognized.
    pub unrecognized: u64,
}

/// Turns raw text frames into [`GameEvent`]s.
///
/// Decoding never fails outright: malformed frames become
/// [`GameEvent::DecodeFailure`], and frames of an unrecognized `type` yield
/// `None`.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder<C> {
    codec: C,
    stats: DecodeStats,
}

impl<C: Codec> FrameDecoder<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            stats: DecodeStats::default(),
        }
    }

    /// Decodes one frame.
    pub fn decode(&mut self, raw: &str) -> Option<GameEvent> {
        let parsed = self
            .codec
            .decode::<ServerMessage>(raw.as_bytes())
            .and_then(|msg| msg.validate().map(|()| msg));

        let msg = match parsed {
            Ok(msg) => msg,
            Err(e) => {
                self.stats.failed += 1;
                tracing::debug!(error = %e, frame = raw, "frame failed to decode");
                return Some(GameEvent::DecodeFailure {
                    raw: raw.to_owned(),
                    reason: e.to_string(),
                });
            }
        };

        match msg.into_event() {
            Some(event) => {
                self.stats.decoded += 1;
                tracing::trace!(event = event.name(), "frame decoded");
                Some(event)
            }
            None => {
                self.stats.unrecognized += 1;
                tracing::debug!(frame = raw, "dropping frame with unrecognized type");
                None
            }
        }
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }
}
