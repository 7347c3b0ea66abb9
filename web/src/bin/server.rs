//! Bingo session server.
//!
//! # Usage
//!
//! ```bash
//! PORT=3000 RUST_LOG=bingo_web=debug cargo run --bin bingo-server
//! ```

use anyhow::Context;
use bingo_core::environment::SystemRandom;
use bingo_web::{build_router, AppState, Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        address = %config.bind_address(),
        observer_buffer = config.observer_buffer,
        max_observers = config.max_observers,
        metrics = config.metrics_enabled,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config, Arc::new(SystemRandom))?;
    let store = Arc::clone(&state.store);
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!(address = %listener.local_addr()?, "Bingo server listening");

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                // Closing observers lets WebSocket connections finish
                store.shutdown();
                let _ = signalled_tx.send(());
            })
            .await
    });

    let grace = config.shutdown_timeout();
    tokio::select! {
        result = &mut server => result??,
        () = async {
            let _ = signalled_rx.await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(timeout_secs = grace.as_secs(), "Graceful shutdown timed out, aborting");
            server.abort();
        }
    }

    info!("Bingo server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}
