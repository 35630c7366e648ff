//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::RoyaleError;

/// Everything the client needs to know up front.
///
/// Every field has a default, so a config can be deserialized from a
/// partial document:
///
/// ```rust
/// use royale::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_endpoint("game.example", 9000)
///     .with_reconnect_interval(std::time::Duration::from_secs(2));
/// assert_eq!(config.endpoint_url(), "ws://game.example:9000/echo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Game server host.
    pub host: String,

    /// Game server port.
    pub port: u16,

    /// Request path of the socket endpoint.
    pub path: String,

    /// Use `wss://` instead of `ws://`.
    pub secure: bool,

    /// Literal sent once every time the socket opens.
    pub handshake: String,

    /// Wait between a lost connection and the next attempt.
    pub reconnect_interval: Duration,

    /// Countdown refresh cadence.
    pub tick_interval: Duration,

    /// How long an explicit close may take before the socket is dropped.
    pub close_timeout: Duration,

    /// Capacity of the command channel between handles and the client task.
    pub command_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7896,
            path: "/echo".to_string(),
            secure: false,
            handshake: "Message to send".to_string(),
            reconnect_interval: Duration::from_secs(5),
            tick_interval: Duration::from_millis(500),
            close_timeout: Duration::from_secs(1),
            command_capacity: 32,
        }
    }
}

impl ClientConfig {
    /// Shortest reconnect interval accepted.
    pub const MIN_RECONNECT_INTERVAL: Duration = Duration::from_millis(100);

    /// Sets host and port.
    #[must_use]
    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_handshake(mut self, handshake: impl Into<String>) -> Self {
        self.handshake = handshake.into();
        self
    }

    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// The socket URL, e.g. `ws://localhost:7896/echo`.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}:{}{}", self.host, self.port, self.path)
    }

    /// Checks the config and clamps out-of-range values.
    ///
    /// Called automatically when the client starts. Rules:
    /// - `host` must not be empty, `port` must not be 0.
    /// - `path` gets a leading `/` if it lacks one.
    /// - `reconnect_interval` is raised to [`Self::MIN_RECONNECT_INTERVAL`].
    /// - `command_capacity` is raised to 1 (tokio panics on 0).
    ///
    /// # Errors
    /// Returns [`RoyaleError::InvalidConfig`] for an unusable endpoint.
    pub fn validated(mut self) -> Result<Self, RoyaleError> {
        if self.host.trim().is_empty() {
            return Err(RoyaleError::InvalidConfig("host is empty".into()));
        }
        if self.port == 0 {
            return Err(RoyaleError::InvalidConfig("port is 0".into()));
        }
        if !self.path.starts_with('/') {
            self.path.insert(0, '/');
        }
        if self.reconnect_interval < Self::MIN_RECONNECT_INTERVAL {
            tracing::warn!(
                requested_ms = self.reconnect_interval.as_millis() as u64,
                "reconnect_interval below minimum, clamping"
            );
            self.reconnect_interval = Self::MIN_RECONNECT_INTERVAL;
        }
        self.command_capacity = self.command_capacity.max(1);
        Ok(self)
    }
}
