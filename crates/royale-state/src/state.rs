//! The mirrored game state and the reduction of events into it.

use royale_protocol::{GameEvent, RoundRules};
use serde::{Deserialize, Serialize};

use crate::roster::same_name;
use crate::{Phase, Roster};

/// What applying one event did, beyond the state change itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// `false` when the event left the state untouched.
    pub changed: bool,
    /// Set when a `RoundEnd` into the end phase named a winner.
    pub winner: Option<String>,
}

impl Applied {
    fn changed() -> Self {
        Self {
            changed: true,
            winner: None,
        }
    }
}

/// The client's mirror of the server's game.
///
/// Only [`GameState::apply`] mutates it (plus [`GameState::reset`] on an
/// explicit disconnect). A name in `players` is never also in `losers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    players: Roster,
    /// Order of elimination. Not de-duplicated: a repeated `PLAYER_LOST`
    /// is recorded twice.
    losers: Vec<String>,
    phase: Phase,
    rules: RoundRules,
}

impl GameState {
    /// The "not connected" starting state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &Roster {
        &self.players
    }

    pub fn losers(&self) -> &[String] {
        &self.losers
    }

    /// `true` if `name` has been eliminated (case-insensitive).
    pub fn has_lost(&self, name: &str) -> bool {
        self.losers.iter().any(|l| same_name(l, name))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Human-readable phase text.
    pub fn phase_text(&self) -> &'static str {
        self.phase.description()
    }

    pub fn rules(&self) -> &RoundRules {
        &self.rules
    }

    /// Back to the "not connected" starting state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pure form of [`apply`](Self::apply): returns the next state and
    /// leaves `self` alone.
    pub fn reduce(&self, event: &GameEvent) -> (Self, Applied) {
        let mut next = self.clone();
        let applied = next.apply(event);
        (next, applied)
    }

    /// Applies one event in place.
    pub fn apply(&mut self, event: &GameEvent) -> Applied {
        match event {
            GameEvent::Snapshot {
                players,
                losers,
                phase,
            } => {
                // A name the server lists in both is treated as eliminated.
                self.players = Roster::from_names(
                    players
                        .iter()
                        .filter(|p| !losers.iter().any(|l| same_name(l, p)))
                        .cloned(),
                );
                self.losers = losers.clone();
                self.phase = Phase::from_code(*phase);
                tracing::debug!(
                    players = self.players.len(),
                    losers = self.losers.len(),
                    phase = %self.phase,
                    "snapshot applied"
                );
                Applied::changed()
            }

            GameEvent::PlayerAdded { name } => {
                let revived = self.remove_loser(name);
                let added = self.players.insert(name.as_str());
                if revived {
                    tracing::debug!(player = %name, "eliminated player re-added");
                }
                Applied {
                    changed: added || revived,
                    winner: None,
                }
            }

            GameEvent::PlayerLost { name } => {
                let stored = self.players.remove(name).unwrap_or_else(|| name.clone());
                self.losers.push(stored);
                Applied::changed()
            }

            GameEvent::RoundStart(rules) => {
                self.rules = rules.clone();
                Applied::changed()
            }

            GameEvent::RoundEnd { next_phase, winner } => {
                self.phase = Phase::from_code(*next_phase);
                let winner = match winner {
                    Some(w) if self.phase.is_terminal() && !w.is_empty() => Some(w.clone()),
                    Some(w) => {
                        tracing::debug!(winner = %w, phase = %self.phase, "ignoring winner outside end phase");
                        None
                    }
                    None => None,
                };
                Applied {
                    changed: true,
                    winner,
                }
            }

            GameEvent::DecodeFailure { .. } => Applied::default(),
        }
    }

    fn remove_loser(&mut self, name: &str) -> bool {
        let before = self.losers.len();
        self.losers.retain(|l| !same_name(l, name));
        self.losers.len() != before
    }
}
