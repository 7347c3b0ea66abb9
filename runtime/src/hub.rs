//! Observer registry with best-effort fan-out.
//!
//! Every observer owns a bounded queue. Publishing serializes the event once
//! and offers the payload to each queue without waiting; an observer whose
//! queue is full or whose receiver is gone is removed on the spot. A slow
//! observer therefore never holds up the writer or its peers.

use crate::error::HubError;
use crate::metrics::ObserverMetrics;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Identity of one connected observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered observer: its id plus the receiving end of its queue
///
/// The receiver yields serialized JSON events. It returns `None` once the
/// observer has been dropped from the hub (slow consumer or shutdown).
#[derive(Debug)]
pub struct Subscription {
    /// Observer id, used to unsubscribe
    pub id: ObserverId,
    /// Serialized events, in publish order
    pub receiver: mpsc::Receiver<String>,
}

/// Set of connected observers
#[derive(Debug)]
pub struct BroadcastHub {
    observers: Mutex<HashMap<ObserverId, mpsc::Sender<String>>>,
    buffer: usize,
    max_observers: usize,
}

impl BroadcastHub {
    /// Create a hub
    ///
    /// - `buffer`: per-observer queue length (at least 1)
    /// - `max_observers`: connection cap
    #[must_use]
    pub fn new(buffer: usize, max_observers: usize) -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            buffer: buffer.max(1),
            max_observers,
        }
    }

    fn observers(&self) -> MutexGuard<'_, HashMap<ObserverId, mpsc::Sender<String>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an observer whose queue starts with `initial`
    ///
    /// # Errors
    ///
    /// - [`HubError::AtCapacity`] when `max_observers` are already connected
    /// - [`HubError::Serialize`] if `initial` cannot be serialized
    pub fn subscribe_with<T: Serialize>(&self, initial: &T) -> Result<Subscription, HubError> {
        let payload = serde_json::to_string(initial)?;
        let mut observers = self.observers();
        if observers.len() >= self.max_observers {
            tracing::warn!(max = self.max_observers, "Observer rejected, hub at capacity");
            return Err(HubError::AtCapacity(self.max_observers));
        }

        let (sender, receiver) = mpsc::channel(self.buffer);
        // Fresh queue with capacity >= 1, cannot be full
        let _ = sender.try_send(payload);

        let id = ObserverId::new();
        observers.insert(id, sender);
        ObserverMetrics::record_connected(observers.len());
        tracing::debug!(%id, observers = observers.len(), "Observer connected");

        Ok(Subscription { id, receiver })
    }

    /// Offer `event` to every observer, dropping any that cannot take it
    ///
    /// Returns how many observers accepted the event.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Serialize`] if `event` cannot be serialized; no
    /// observer is touched in that case.
    pub fn publish<T: Serialize>(&self, event: &T) -> Result<usize, HubError> {
        let payload = serde_json::to_string(event)?;
        let mut observers = self.observers();

        observers.retain(|id, sender| match sender.try_send(payload.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(%id, "Observer queue full, dropping observer");
                ObserverMetrics::record_dropped();
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(%id, "Observer gone, removing");
                false
            }
        });

        ObserverMetrics::record_connected(observers.len());
        Ok(observers.len())
    }

    /// Remove an observer; returns whether it was still registered
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers();
        let removed = observers.remove(&id).is_some();
        if removed {
            ObserverMetrics::record_connected(observers.len());
            tracing::debug!(%id, observers = observers.len(), "Observer disconnected");
        }
        removed
    }

    /// Drop every observer; their receivers end after draining
    pub fn close_all(&self) {
        let mut observers = self.observers();
        let count = observers.len();
        observers.clear();
        ObserverMetrics::record_connected(0);
        tracing::info!(count, "All observers closed");
    }

    /// Connected observers
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers().len()
    }

    /// No observers connected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers().is_empty()
    }

    /// Connection cap
    #[must_use]
    pub const fn max_observers(&self) -> usize {
        self.max_observers
    }
}
