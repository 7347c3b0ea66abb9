//! Domain types for the bingo session.

use serde::{Deserialize, Serialize};

/// Highest number on the board; numbers run `1..=MAX_NUMBER`
pub const MAX_NUMBER: u8 = 75;

/// Numbers printed on every ticket
pub const TICKET_SIZE: usize = 15;

/// Smallest ticket id (ids are always five digits)
pub const MIN_TICKET_ID: u32 = 10_000;

/// Largest ticket id
pub const MAX_TICKET_ID: u32 = 99_999;

/// Five-digit ticket identifier, unique among the active tickets
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u32);

impl TicketId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TicketId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A player's ticket
///
/// `numbers` is fixed when the ticket is issued and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,
    /// Display label
    pub name: String,
    /// The ticket's 15 distinct numbers, ascending
    numbers: Vec<u8>,
    /// Player has declared readiness
    pub ready: bool,
    /// Ticket has been verified as a winner
    pub winner: bool,
}

impl Ticket {
    /// Creates a fresh ticket, not ready and not a winner
    ///
    /// Numbers are stored ascending.
    #[must_use]
    pub fn new(id: TicketId, name: String, mut numbers: Vec<u8>) -> Self {
        numbers.sort_unstable();
        Self {
            id,
            name,
            numbers,
            ready: false,
            winner: false,
        }
    }

    /// The ticket's numbers, ascending
    #[must_use]
    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    /// Default display label for a ticket issued without a name
    #[must_use]
    pub fn default_name(id: TicketId) -> String {
        format!("Player {id}")
    }
}

/// Global session status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Waiting to start (or stopped)
    #[default]
    Idle,
    /// Numbers can be drawn
    Running,
    /// A winner has been confirmed
    Over,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Over => write!(f, "over"),
        }
    }
}

/// One row of the progress snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgress {
    /// Ticket id
    pub id: TicketId,
    /// Display label
    pub name: String,
    /// Ticket numbers already drawn
    pub hits: usize,
    /// Numbers on the ticket
    pub total: usize,
    /// `round(100 * hits / total)`
    pub progress_percent: u8,
    /// Ready flag
    pub ready: bool,
    /// Winner flag
    pub winner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_numbers_sorted() {
        let ticket = Ticket::new(TicketId::new(12_345), "A".into(), vec![9, 3, 75, 1]);
        assert_eq!(ticket.numbers(), &[1, 3, 9, 75]);
        assert!(!ticket.ready);
        assert!(!ticket.winner);
    }

    #[test]
    fn default_name_uses_id() {
        assert_eq!(Ticket::default_name(TicketId::new(54_321)), "Player 54321");
    }

    #[test]
    fn ticket_json_shape() {
        let ticket = Ticket::new(TicketId::new(10_001), "Ann".into(), vec![2, 1]);
        let json = serde_json::to_value(&ticket).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 10001,
                "name": "Ann",
                "numbers": [1, 2],
                "ready": false,
                "winner": false
            })
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Running).unwrap_or_default();
        assert_eq!(json, r#""running""#);
    }
}
