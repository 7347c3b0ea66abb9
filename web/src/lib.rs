//! HTTP and WebSocket shell around the bingo session.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, WebSocket
//! │  - Request parsing                      │  ← Correlation ids, tracing
//! │  - Response shaping                     │  ← Metrics
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - Session reducer                      │  ← Every game rule
//! │  - Event descriptions (values)          │  ← Published by the Store
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Build Action** from path and body
//! 3. **Dispatch** through the `Store` (one writer at a time)
//! 4. **Publish** the reducer's events to every observer, lock still held
//! 5. **Map reply** to an HTTP response

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use extractors::TicketPath;
pub use middleware::{correlation_id_layer, CorrelationId, CORRELATION_ID_HEADER};
pub use routes::build_router;
pub use state::{AppState, SessionStore};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
