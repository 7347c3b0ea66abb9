//! WebSocket observer endpoint.
//!
//! ```text
//! Client          WebSocket Handler          Store / Hub
//!   │                    │                     │
//!   ├─ Connect ─────────>│                     │
//!   │                    ├─ subscribe() ──────>│  (state snapshot queued)
//!   │<─ {"type":"state"} ┤                     │
//!   │                    │<── publish ─────────┤
//!   │<─ {"type":...} ────┤                     │
//! ```
//!
//! The channel is one-way: inbound text is ignored, a close frame ends the
//! connection. When the hub drops the observer (queue full or shutdown) the
//! socket is closed from the server side.

use crate::middleware::CorrelationId;
use crate::state::AppState;
use crate::WebResult;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use bingo_runtime::hub::{BroadcastHub, ObserverId, Subscription};
use bingo_session::SessionState;
use futures::{stream::StreamExt, SinkExt};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

/// Upgrade to a WebSocket observer.
///
/// The observer is registered before the upgrade completes, so the `state`
/// event it receives first is consistent with every event after it. A failed
/// upgrade gives the slot back.
///
/// # Errors
///
/// Returns 503 when the observer limit is reached or the server is shutting
/// down.
pub async fn handle(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
) -> WebResult<Response> {
    let subscription = state.store.subscribe(SessionState::state_event).await?;
    info!(observer = %subscription.id, "WebSocket observer connecting");

    let span = tracing::info_span!("ws_observer", observer = %subscription.id, %correlation_id);
    let release = release_on_failure(Arc::clone(state.store.hub()), subscription.id);
    Ok(ws
        .on_failed_upgrade(release)
        .on_upgrade(move |socket| handle_socket(socket, state, subscription).instrument(span)))
}

/// Unregister an observer whose upgrade never completed.
fn release_on_failure(
    hub: Arc<BroadcastHub>,
    id: ObserverId,
) -> impl FnOnce(axum::Error) + Send + 'static {
    move |error| {
        warn!(observer = %id, %error, "WebSocket upgrade failed");
        hub.unsubscribe(id);
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, subscription: Subscription) {
    let Subscription {
        id,
        receiver: mut events,
    } = subscription;
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = events.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                return;
            }
        }
        // Dropped by the hub
        let _ = sender.send(Message::Close(None)).await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Close(_) => break,
                Message::Text(_) | Message::Binary(_) => {
                    debug!("Ignoring inbound message on push channel");
                }
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    state.store.hub().unsubscribe(id);
    info!(observer = %id, "WebSocket observer closed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    #[test]
    fn failed_upgrade_frees_the_slot() {
        let hub = Arc::new(BroadcastHub::new(4, 1));
        let subscription = hub.subscribe_with(&"state").unwrap();
        assert!(hub.subscribe_with(&"state").is_err());

        release_on_failure(Arc::clone(&hub), subscription.id)(axum::Error::new("handshake failed"));

        assert!(hub.is_empty());
        assert!(hub.subscribe_with(&"state").is_ok());
    }
}
