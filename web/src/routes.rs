//! Router assembly.

use crate::handlers::{health, metrics, session, websocket};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router.
///
/// # Routes
///
/// | method | path | handler |
/// |---|---|---|
/// | POST | `/session/ticket` | issue one ticket |
/// | POST | `/session/tickets/bulk` | replace tickets, declare player count |
/// | GET | `/session/ticket/:id` | fetch a ticket |
/// | POST | `/session/ready/:id` | mark ready |
/// | POST | `/session/start` | start drawing |
/// | POST | `/session/stop` | stop drawing |
/// | GET | `/session/draw` | draw a number |
/// | POST | `/session/bingo/:id` | claim bingo |
/// | POST | `/session/reset` | clear draws, keep players |
/// | POST | `/session/newgame` | clear everything |
/// | GET | `/session/state` | current session view |
/// | GET | `/ws` | observer push channel |
/// | GET | `/health`, `/health/ready` | liveness, readiness |
/// | GET | `/metrics` | Prometheus scrape |
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/ticket", post(session::issue_ticket))
        .route("/tickets/bulk", post(session::issue_bulk))
        .route("/ticket/:id", get(session::get_ticket))
        .route("/ready/:id", post(session::mark_ready))
        .route("/start", post(session::start))
        .route("/stop", post(session::stop))
        .route("/draw", get(session::draw))
        .route("/bingo/:id", post(session::submit_bingo))
        .route("/reset", post(session::reset))
        .route("/newgame", post(session::new_game))
        .route("/state", get(session::snapshot));

    Router::new()
        .nest("/session", session_routes)
        .route("/ws", get(websocket::handle))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(metrics::render))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
