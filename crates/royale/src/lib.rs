//! # Royale
//!
//! Realtime companion-game client for ChatRoyale.
//!
//! The client keeps one WebSocket open to the game server, reconnecting on
//! its own when the link drops, and mirrors the server's game (players,
//! losers, phase, round rules) from the frames it receives. A countdown for
//! the current round is derived locally. UIs read the mirrored state through
//! a [`RoyaleClient`] handle and subscribe to [`Notification`]s on the
//! [`EventBus`].
//!
//! ## Layers
//!
//! ```text
//! royale-transport  sockets (WebSocket, in-memory)
//! royale-protocol   frames → GameEvent
//! royale-state      GameEvent → GameState, per-viewer text
//! royale-timer      round rules → countdown
//! royale            the actor tying them together
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use royale::prelude::*;
//!
//! # async fn run() -> Result<(), RoyaleError> {
//! let client = RoyaleClient::start(ClientConfig::default())?;
//! client.subscribe(EventKind::Winner, |n| {
//!     if let Notification::Winner(name) = n {
//!         println!("{name} won");
//!     }
//! });
//! client.connect().await?;
//! println!("{}", client.summary("viewer"));
//! # Ok(())
//! # }
//! ```

mod bus;
mod client;
mod config;
mod error;
mod manager;
mod reconnect;

pub use bus::{EventBus, EventKind, Notification, SubscriptionId};
pub use client::{RoyaleClient, RoyaleClientBuilder};
pub use config::ClientConfig;
pub use error::RoyaleError;
pub use manager::ClientStatus;
pub use reconnect::{ExponentialBackoff, FixedInterval, ReconnectPolicy};

pub use royale_protocol::{DecodeStats, GameEvent, Nonce, RoundRules};
pub use royale_state::{GameState, LinkStatus, MyState, Phase};
pub use royale_timer::{Clock, Countdown, ManualClock, SystemClock};
pub use royale_transport::{memory, Connection, ConnectionState, Connector};

/// Common imports for client code.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientStatus, ConnectionState, EventKind, GameEvent, MyState, Notification,
        Phase, RoyaleClient, RoyaleError, RoundRules,
    };
}
