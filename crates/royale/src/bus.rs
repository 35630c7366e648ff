//! Typed publish/subscribe for client notifications.
//!
//! Handlers run synchronously on the client task, in subscription order. A
//! panicking handler is caught and logged, so the remaining handlers for the
//! same notification still run and the client keeps going.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use royale_protocol::GameEvent;
use royale_timer::Countdown;
use royale_transport::ConnectionState;

/// What a subscriber can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Snapshot,
    PlayerAdded,
    PlayerLost,
    RoundStart,
    RoundEnd,
    DecodeFailure,
    /// The game ended with a named winner.
    Winner,
    /// A countdown tick.
    Countdown,
    /// The socket changed state.
    Connection,
    /// Human-readable lifecycle line.
    Log,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        Self::Snapshot,
        Self::PlayerAdded,
        Self::PlayerLost,
        Self::RoundStart,
        Self::RoundEnd,
        Self::DecodeFailure,
        Self::Winner,
        Self::Countdown,
        Self::Connection,
        Self::Log,
    ];
}

/// A message delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Game(GameEvent),
    Winner(String),
    Countdown(Countdown),
    Connection(ConnectionState),
    Log(String),
}

impl Notification {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Game(event) => match event {
                GameEvent::Snapshot { .. } => EventKind::Snapshot,
                GameEvent::PlayerAdded { .. } => EventKind::PlayerAdded,
                GameEvent::PlayerLost { .. } => EventKind::PlayerLost,
                GameEvent::RoundStart(_) => EventKind::RoundStart,
                GameEvent::RoundEnd { .. } => EventKind::RoundEnd,
                GameEvent::DecodeFailure { .. } => EventKind::DecodeFailure,
            },
            Self::Winner(_) => EventKind::Winner,
            Self::Countdown(_) => EventKind::Countdown,
            Self::Connection(_) => EventKind::Connection,
            Self::Log(_) => EventKind::Log,
        }
    }
}

/// Returned by [`EventBus::subscribe`]; pass it to
/// [`EventBus::unsubscribe`] to remove the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Handler = Arc<dyn Fn(&Notification) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
}

/// Registry of handlers keyed by [`EventKind`]. Clones share the registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`. Any number of handlers may listen to
    /// the same kind; they run in the order they subscribed.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        tracing::trace!(%id, ?kind, "handler subscribed");
        id
    }

    /// Removes a handler. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        for handlers in registry.handlers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(h, _)| *h == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of handlers listening for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Delivers `notification` to every handler of its kind.
    ///
    /// Returns how many handlers completed without panicking. The handler
    /// list is copied out first, so handlers may subscribe or unsubscribe
    /// without deadlocking.
    pub fn publish(&self, notification: &Notification) -> usize {
        let kind = notification.kind();
        let handlers: Vec<(SubscriptionId, Handler)> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            match registry.handlers.get(&kind) {
                Some(list) => list.clone(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for (id, handler) in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(notification))) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::warn!(%id, ?kind, "event handler panicked"),
            }
        }
        delivered
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let total: usize = registry.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus").field("handlers", &total).finish()
    }
}
