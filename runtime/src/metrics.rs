//! Prometheus metrics for observability and monitoring.
//!
//! This module installs the process-wide recorder and describes every metric
//! the server emits:
//! - Session activity (tickets, draws, claims, wins)
//! - Observer churn
//! - Reducer execution time
//!
//! # Example
//!
//! ```rust,no_run
//! use bingo_runtime::metrics;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = metrics::install()?;
//!
//! // Serve `handle.render()` at /metrics
//! # Ok(())
//! # }
//! ```

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the Prometheus recorder, once per process.
///
/// Later calls return a handle to the recorder installed by the first one, so
/// several servers (or tests) in one process share the same registry.
///
/// # Errors
///
/// Returns error if the exporter cannot be built, or if some other recorder
/// is already installed globally.
pub fn install() -> Result<PrometheusHandle, MetricsError> {
    let mut slot = HANDLE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[
                0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1,
            ],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!("Prometheus recorder installed");

    *slot = Some(handle.clone());
    Ok(handle)
}

/// Register all metric descriptions.
fn register_metrics() {
    // Session
    describe_counter!(
        "bingo_tickets_issued_total",
        "Total number of tickets issued"
    );
    describe_counter!(
        "bingo_numbers_drawn_total",
        "Total number of numbers drawn"
    );
    describe_counter!(
        "bingo_claims_total",
        "Bingo claims by verdict (win or reject)"
    );
    describe_counter!("bingo_games_won_total", "Games that ended with a winner");

    // Observers
    describe_gauge!(
        "bingo_observers_connected",
        "Observers currently connected"
    );
    describe_counter!(
        "bingo_observers_dropped_total",
        "Observers dropped because their queue was full"
    );

    // Reducer
    describe_histogram!(
        "bingo_reducer_duration_seconds",
        "Time spent inside the reducer, lock held"
    );
}

/// Reducer metrics recorder.
pub struct ReducerMetrics;

impl ReducerMetrics {
    /// Record one reducer call.
    pub fn record_action(duration: Duration) {
        histogram!("bingo_reducer_duration_seconds").record(duration.as_secs_f64());
    }
}

/// Observer metrics recorder.
pub struct ObserverMetrics;

impl ObserverMetrics {
    /// Record the current observer count.
    #[allow(clippy::cast_precision_loss)] // Observer counts are far below 2^52
    pub fn record_connected(count: usize) {
        gauge!("bingo_observers_connected").set(count as f64);
    }

    /// Record an observer dropped for falling behind.
    pub fn record_dropped() {
        counter!("bingo_observers_dropped_total").increment(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        let first = install().unwrap();
        let second = install().unwrap();

        ReducerMetrics::record_action(Duration::from_micros(20));
        ObserverMetrics::record_connected(3);
        ObserverMetrics::record_dropped();

        let rendered = second.render();
        assert!(rendered.contains("bingo_reducer_duration_seconds"));
        assert!(rendered.contains("bingo_observers_connected"));
        assert!(rendered.contains("bingo_observers_dropped_total"));
        assert_eq!(first.render().is_empty(), rendered.is_empty());
    }
}
