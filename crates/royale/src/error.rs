//! Unified error type for the ChatRoyale client.

use royale_transport::TransportError;

/// Top-level error for the client crate.
///
/// The `#[from]` attribute auto-generates `From` impls, so the `?` operator
/// converts transport errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RoyaleError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The configuration cannot be used as given.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The client has been stopped; its background task is gone.
    #[error("client stopped")]
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let royale_err: RoyaleError = err.into();
        assert!(matches!(royale_err, RoyaleError::Transport(_)));
        assert!(royale_err.to_string().contains("gone"));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(RoyaleError::Stopped.to_string(), "client stopped");
        assert_eq!(
            RoyaleError::InvalidConfig("empty host".into()).to_string(),
            "invalid configuration: empty host"
        );
    }
}
