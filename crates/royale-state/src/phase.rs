//! The game phase and its human-readable text.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the server says the game is.
///
/// The server sends a numeric code; [`Phase::from_code`] maps it. A normal
/// game moves through:
///
/// ```text
/// Idle → Lobby → Round ⇄ InBetween → End
/// ```
///
/// - **NotConnected**: no snapshot received yet (client-side only).
/// - **Idle**: server up, no game scheduled.
/// - **Lobby**: accepting players.
/// - **Round**: a round is being played.
/// - **InBetween**: between two rounds.
/// - **End**: the game is over.
/// - **Unrecognized**: a code this client does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    NotConnected,
    Idle,
    Lobby,
    Round,
    InBetween,
    End,
    Unrecognized(i64),
}

impl Phase {
    /// Maps the server's numeric phase code.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Idle,
            1 => Self::Lobby,
            2 => Self::Round,
            3 => Self::InBetween,
            4 => Self::End,
            other => Self::Unrecognized(other),
        }
    }

    /// The server code for this phase, if it has one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::NotConnected => None,
            Self::Idle => Some(0),
            Self::Lobby => Some(1),
            Self::Round => Some(2),
            Self::InBetween => Some(3),
            Self::End => Some(4),
            Self::Unrecognized(code) => Some(*code),
        }
    }

    /// The text shown to users. This is the only place phase text lives.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotConnected => "Not connected",
            Self::Idle => "Waiting for server to start",
            Self::Lobby => "Waiting for game to start",
            Self::Round => "Mid-game",
            Self::InBetween => "Waiting for the next round to start",
            Self::End => "End of game",
            Self::Unrecognized(_) => "Unrecognized game state",
        }
    }

    /// Returns `true` once a game has started and before it ends.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Round | Self::InBetween)
    }

    /// Returns `true` for the final phase of a game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_from_code_table() {
        assert_eq!(Phase::from_code(0), Phase::Idle);
        assert_eq!(Phase::from_code(1), Phase::Lobby);
        assert_eq!(Phase::from_code(2), Phase::Round);
        assert_eq!(Phase::from_code(3), Phase::InBetween);
        assert_eq!(Phase::from_code(4), Phase::End);
        assert_eq!(Phase::from_code(9), Phase::Unrecognized(9));
        assert_eq!(Phase::from_code(-1), Phase::Unrecognized(-1));
    }

    #[test]
    fn test_phase_descriptions() {
        assert_eq!(Phase::Idle.to_string(), "Waiting for server to start");
        assert_eq!(Phase::Lobby.to_string(), "Waiting for game to start");
        assert_eq!(Phase::Round.to_string(), "Mid-game");
        assert_eq!(
            Phase::InBetween.to_string(),
            "Waiting for the next round to start"
        );
        assert_eq!(Phase::End.to_string(), "End of game");
        assert_eq!(Phase::Unrecognized(42).to_string(), "Unrecognized game state");
        assert_eq!(Phase::default().to_string(), "Not connected");
    }

    #[test]
    fn test_phase_code_round_trips_for_known_codes() {
        for code in 0..=4 {
            assert_eq!(Phase::from_code(code).code(), Some(code));
        }
        assert_eq!(Phase::NotConnected.code(), None);
    }

    #[test]
    fn test_phase_is_in_progress() {
        assert!(!Phase::NotConnected.is_in_progress());
        assert!(!Phase::Idle.is_in_progress());
        assert!(!Phase::Lobby.is_in_progress());
        assert!(Phase::Round.is_in_progress());
        assert!(Phase::InBetween.is_in_progress());
        assert!(!Phase::End.is_in_progress());
    }
}
