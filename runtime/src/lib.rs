//! # Bingo Runtime
//!
//! Runtime for the bingo session server.
//!
//! This crate provides the [`Store`](store::Store) that owns the session
//! state, runs the reducer and executes its effects, plus the
//! [`BroadcastHub`](hub::BroadcastHub) that fans events out to observers.
//!
//! ## Core Components
//!
//! - **Store**: state behind a single `RwLock`, one reducer call at a time
//! - **Effect execution**: publish effects run before the write lock is released
//! - **Broadcast hub**: per-observer bounded queues, slow observers dropped
//!
//! ## Example
//!
//! ```ignore
//! use bingo_runtime::{hub::BroadcastHub, store::Store};
//! use std::sync::Arc;
//!
//! let store = Store::new(
//!     SessionState::new(),
//!     SessionReducer::new(),
//!     environment,
//!     Arc::new(BroadcastHub::new(64, 1000)),
//! );
//!
//! // Send an action and get the reducer's reply
//! let reply = store.send(SessionAction::Start).await?;
//!
//! // Read state
//! let drawn = store.state(|s| s.pool.drawn().len()).await;
//! ```

use bingo_core::{effect::Effect, reducer::Reducer};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Observer registry and fan-out
pub mod hub;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while registering or publishing to observers
    #[derive(Error, Debug)]
    pub enum HubError {
        /// The connection cap has been reached
        #[error("Observer limit of {0} reached")]
        AtCapacity(usize),

        /// An event could not be serialized to JSON
        #[error("Event serialization failed: {0}")]
        Serialize(#[from] serde_json::Error),
    }

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` or `subscribe()` is called
        /// after shutdown was initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// An observer could not be registered
        #[error(transparent)]
        Hub(#[from] HubError),
    }
}

/// Health check status levels
///
/// Indicates the current health state of a component or system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is fully operational
    Healthy,

    /// Component is operational but experiencing issues (e.g., observer cap reached)
    Degraded,

    /// Component is not operational
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    /// Name of the component being checked
    pub component: String,

    /// Current health status
    pub status: HealthStatus,

    /// Optional message providing details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Optional metadata (e.g., observer counts)
    pub metadata: Vec<(String, String)>,
}

impl HealthCheck {
    /// Create a healthy check result
    #[must_use]
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            message: None,
            metadata: Vec::new(),
        }
    }

    /// Create a degraded check result
    #[must_use]
    pub fn degraded(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Create an unhealthy check result
    #[must_use]
    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Add metadata to the health check
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{Arc, Effect, HealthCheck, Reducer, RwLock};
    use crate::error::StoreError;
    use crate::hub::{BroadcastHub, Subscription};
    use crate::metrics::ReducerMetrics;
    use bingo_core::effect::Reduction;
    use serde::Serialize;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (publishing to the hub)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Ordering
    ///
    /// Effects are executed while the write lock is still held, so observers
    /// see events in exactly the order the mutations happened, and an
    /// observer registered through [`Store::subscribe`] can neither miss nor
    /// double-receive an event relative to its initial snapshot.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: RwLock<S>,
        reducer: R,
        environment: E,
        hub: Arc<BroadcastHub>,
        shutdown: AtomicBool,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        R::Event: Serialize,
    {
        /// Create a new Store
        ///
        /// # Arguments
        ///
        /// - `initial_state`: Starting state
        /// - `reducer`: Business logic
        /// - `environment`: Injected dependencies
        /// - `hub`: Where published events go
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E, hub: Arc<BroadcastHub>) -> Self {
            Self {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                hub,
                shutdown: AtomicBool::new(false),
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Executes the returned effects in order
        /// 4. Releases the lock and returns the reducer's reply
        ///
        /// Concurrent `send()` calls serialize on the lock.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<R::Reply, StoreError> {
            if self.is_shutting_down() {
                return Err(StoreError::ShutdownInProgress);
            }

            let mut state = self.state.write().await;

            let start = Instant::now();
            let Reduction { reply, effects } =
                self.reducer.reduce(&mut state, action, &self.environment);
            ReducerMetrics::record_action(start.elapsed());

            for effect in effects {
                self.execute_effect(effect);
            }
            drop(state);

            Ok(reply)
        }

        fn execute_effect(&self, effect: Effect<R::Event>) {
            let Effect::Publish(event) = effect;
            if let Err(error) = self.hub.publish(&event) {
                tracing::error!(%error, "Failed to publish event");
            }
        }

        /// Read state through a closure
        ///
        /// Holds the read lock only for the duration of `f`.
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Register an observer whose first event is built from current state
        ///
        /// The initial event and the registration happen under the read lock,
        /// so no mutation can slip between them.
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
        /// - [`StoreError::Hub`] if the hub is full or the event cannot be serialized
        pub async fn subscribe<F>(&self, initial: F) -> Result<Subscription, StoreError>
        where
            F: FnOnce(&S) -> R::Event,
        {
            if self.is_shutting_down() {
                return Err(StoreError::ShutdownInProgress);
            }
            let state = self.state.read().await;
            let event = initial(&state);
            Ok(self.hub.subscribe_with(&event)?)
        }

        /// The hub events are published to
        #[must_use]
        pub fn hub(&self) -> &Arc<BroadcastHub> {
            &self.hub
        }

        /// Whether shutdown has been initiated
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Initiate shutdown
        ///
        /// New actions and subscriptions are rejected. Every observer is
        /// dropped; their receivers end once drained.
        pub fn shutdown(&self) {
            if self.shutdown.swap(true, Ordering::AcqRel) {
                return;
            }
            tracing::info!(observers = self.hub.len(), "Store shutting down");
            self.hub.close_all();
        }

        /// Perform a health check on the Store
        ///
        /// - Unhealthy once shutdown has begun
        /// - Degraded while the observer cap is reached
        #[must_use]
        pub fn health(&self) -> HealthCheck {
            let observers = self.hub.len();
            let capacity = self.hub.max_observers();

            let check = if self.is_shutting_down() {
                HealthCheck::unhealthy("store", "Store is shutting down")
            } else if observers >= capacity {
                HealthCheck::degraded("store", format!("Observer limit of {capacity} reached"))
            } else {
                HealthCheck::healthy("store")
            };

            check
                .with_metadata("observers", observers.to_string())
                .with_metadata("observer_capacity", capacity.to_string())
        }
    }
}
