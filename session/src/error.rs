//! Session error taxonomy.

use crate::types::TicketId;
use thiserror::Error;

/// Errors returned by session operations
///
/// Some of these are "soft": the caller gets an `{ok:false}`-style answer
/// rather than an HTTP error. See [`BingoError::is_soft`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BingoError {
    /// Unknown ticket id
    #[error("Ticket {0} not found")]
    NotFound(TicketId),

    /// Malformed request data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A draw was requested while the session is not running
    #[error("Session is not running")]
    NotRunning,

    /// Every number has already been drawn
    #[error("Draw pool is exhausted")]
    Exhausted,

    /// The session already has a winner
    #[error("Game is over")]
    GameOver,

    /// The readiness gate blocks starting the session
    #[error("Not all players are ready")]
    NotAllReady,

    /// All five-digit ticket ids are taken
    #[error("No free ticket ids left")]
    TicketIdsExhausted,
}

impl BingoError {
    /// Whether this is a caller-recoverable state conflict rather than a bad request
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::NotRunning | Self::Exhausted | Self::GameOver | Self::NotAllReady
        )
    }
}

/// Result alias for session operations
pub type Result<T> = std::result::Result<T, BingoError>;
