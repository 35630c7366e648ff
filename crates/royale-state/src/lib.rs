//! Game state for ChatRoyale.
//!
//! The server drives the game; this crate keeps a local mirror of it.
//!
//! # Key types
//!
//! - [`GameState`]: players, losers, phase, and round rules, updated by
//!   [`GameState::apply`] for each decoded event
//! - [`Phase`]: the server's numeric phase and its display text
//! - [`Roster`]: case-insensitive, case-preserving player list
//! - [`MyState`]: what the state means for one viewer

mod phase;
mod roster;
mod state;
mod view;

pub use phase::Phase;
pub use roster::{same_name, Roster};
pub use state::{Applied, GameState};
pub use view::{summary, LinkStatus, MyState};
