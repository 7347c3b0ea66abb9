//! Application state for Axum handlers.

use crate::config::Config;
use bingo_core::environment::NumberSource;
use bingo_runtime::hub::BroadcastHub;
use bingo_runtime::metrics::{self, MetricsError};
use bingo_runtime::store::Store;
use bingo_session::{SessionAction, SessionEnvironment, SessionReducer, SessionState};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// The store holding the one live session
pub type SessionStore = Store<SessionState, SessionAction, SessionEnvironment, SessionReducer>;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The session store
    pub store: Arc<SessionStore>,
    /// Prometheus handle, `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State around a fresh idle session.
    ///
    /// No metrics recorder is installed; see [`AppState::from_config`].
    #[must_use]
    pub fn new(rng: Arc<dyn NumberSource>, observer_buffer: usize, max_observers: usize) -> Self {
        let hub = Arc::new(BroadcastHub::new(observer_buffer, max_observers));
        let store = Store::new(
            SessionState::new(),
            SessionReducer::new(),
            SessionEnvironment::new(rng),
            hub,
        );
        Self {
            store: Arc::new(store),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle so `/metrics` can render it.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build state from configuration, installing the recorder when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if metrics are enabled and the recorder cannot
    /// be installed.
    pub fn from_config(config: &Config, rng: Arc<dyn NumberSource>) -> Result<Self, MetricsError> {
        let state = Self::new(rng, config.observer_buffer, config.max_observers);
        if config.metrics_enabled {
            Ok(state.with_metrics(metrics::install()?))
        } else {
            Ok(state)
        }
    }
}
