//! Derived, per-viewer text: "what does this mean for me?".

use std::fmt;

use crate::GameState;

/// The socket as a viewer cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// A socket is open.
    Up,
    /// No open socket. `was_open` tells a first connection attempt apart
    /// from a reconnect after losing an established link.
    Down { was_open: bool },
}

/// Where the viewing user stands in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MyState {
    Connecting,
    Reconnecting,
    GameEnded,
    Lost,
    CanJoin,
    MissedStart,
    Playing,
}

impl MyState {
    /// Resolves the viewer's state. Earlier rules win:
    ///
    /// 1. never connected (or no snapshot yet) → `Connecting`
    /// 2. lost an established link → `Reconnecting`
    /// 3. end phase → `GameEnded`
    /// 4. viewer was eliminated → `Lost`
    /// 5. not playing, game not started → `CanJoin`
    /// 6. not playing, game under way → `MissedStart`
    /// 7. `Playing`
    pub fn resolve(state: &GameState, link: LinkStatus, self_name: &str) -> Self {
        match link {
            LinkStatus::Down { was_open: false } => return Self::Connecting,
            LinkStatus::Down { was_open: true } => return Self::Reconnecting,
            LinkStatus::Up => {}
        }

        let phase = state.phase();
        if phase == crate::Phase::NotConnected {
            return Self::Connecting;
        }
        if phase.is_terminal() {
            return Self::GameEnded;
        }
        if state.has_lost(self_name) {
            return Self::Lost;
        }
        if !state.players().contains(self_name) {
            return if phase.is_in_progress() {
                Self::MissedStart
            } else {
                Self::CanJoin
            };
        }
        Self::Playing
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Reconnecting => "Reconnecting...",
            Self::GameEnded => "The game ended",
            Self::Lost => "You lost! Wait for the next game to play again.",
            Self::CanJoin => "Type anything to join",
            Self::MissedStart => "The game started without you.",
            Self::Playing => "You are playing",
        }
    }
}

impl fmt::Display for MyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One-line status: `"<phase> | <n> player(s) | <my state>"`.
pub fn summary(state: &GameState, link: LinkStatus, self_name: &str) -> String {
    let count = state.players().len();
    let noun = if count == 1 { "player" } else { "players" };
    format!(
        "{} | {count} {noun} | {}",
        state.phase(),
        MyState::resolve(state, link, self_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use royale_protocol::GameEvent;

    fn state_with(players: &[&str], losers: &[&str], phase: i64) -> GameState {
        let mut state = GameState::new();
        state.apply(&GameEvent::Snapshot {
            players: players.iter().map(|s| s.to_string()).collect(),
            losers: losers.iter().map(|s| s.to_string()).collect(),
            phase,
        });
        state
    }

    const UP: LinkStatus = LinkStatus::Up;

    #[test]
    fn test_link_down_wins_over_everything() {
        let state = state_with(&["me"], &[], 4);
        assert_eq!(
            MyState::resolve(&state, LinkStatus::Down { was_open: false }, "me"),
            MyState::Connecting
        );
        assert_eq!(
            MyState::resolve(&state, LinkStatus::Down { was_open: true }, "me"),
            MyState::Reconnecting
        );
    }

    #[test]
    fn test_open_without_snapshot_is_connecting() {
        assert_eq!(
            MyState::resolve(&GameState::new(), UP, "me"),
            MyState::Connecting
        );
    }

    #[test]
    fn test_end_phase_beats_lost() {
        let state = state_with(&[], &["me"], 4);
        assert_eq!(MyState::resolve(&state, UP, "me"), MyState::GameEnded);
    }

    #[test]
    fn test_lost_is_case_insensitive() {
        let state = state_with(&["Ana"], &["Me"], 2);
        assert_eq!(MyState::resolve(&state, UP, "mE"), MyState::Lost);
    }

    #[test]
    fn test_not_playing_before_and_during_game() {
        let lobby = state_with(&["Ana"], &[], 1);
        assert_eq!(MyState::resolve(&lobby, UP, "me"), MyState::CanJoin);

        let idle = state_with(&[], &[], 0);
        assert_eq!(MyState::resolve(&idle, UP, "me"), MyState::CanJoin);

        let round = state_with(&["Ana"], &[], 2);
        assert_eq!(MyState::resolve(&round, UP, "me"), MyState::MissedStart);

        let between = state_with(&["Ana"], &[], 3);
        assert_eq!(MyState::resolve(&between, UP, "me"), MyState::MissedStart);
    }

    #[test]
    fn test_playing() {
        let state = state_with(&["ME"], &[], 2);
        assert_eq!(MyState::resolve(&state, UP, "me"), MyState::Playing);
        assert_eq!(MyState::Playing.to_string(), "You are playing");
    }

    #[test]
    fn test_summary_line() {
        let state = state_with(&["Ana"], &[], 1);
        assert_eq!(
            summary(&state, UP, "me"),
            "Waiting for game to start | 1 player | Type anything to join"
        );

        let state = state_with(&["Ana", "me"], &[], 2);
        assert_eq!(
            summary(&state, UP, "me"),
            "Mid-game | 2 players | You are playing"
        );
    }
}
