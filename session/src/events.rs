//! Push events fanned out to every observer.
//!
//! Each event serializes to a JSON object with a `type` tag:
//!
//! ```json
//! {"type":"number","number":42,"drawn":[7,42],"players":[...]}
//! ```

use crate::types::{PlayerProgress, SessionStatus, TicketId};
use serde::{Deserialize, Serialize};

/// Full session view, sent to an observer when it connects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Current status
    pub status: SessionStatus,
    /// Drawn numbers in draw order
    pub drawn: Vec<u8>,
    /// Per-ticket progress
    pub players: Vec<PlayerProgress>,
    /// `status == Over`
    pub game_over: bool,
    /// Declared player count, 0 when none
    pub expected_player_count: usize,
}

/// Event broadcast to observers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Initial state for a newly connected observer
    #[serde(rename = "state")]
    State(StateSnapshot),

    /// Ticket list or flags changed
    #[serde(rename = "players", rename_all = "camelCase")]
    Players {
        /// Per-ticket progress
        players: Vec<PlayerProgress>,
        /// Declared player count, 0 when none
        expected_player_count: usize,
    },

    /// A number was drawn
    #[serde(rename = "number")]
    Number {
        /// The number just drawn
        number: u8,
        /// Every drawn number, in order
        drawn: Vec<u8>,
        /// Per-ticket progress after the draw
        players: Vec<PlayerProgress>,
    },

    /// A player claimed bingo
    #[serde(rename = "bingo", rename_all = "camelCase")]
    Bingo {
        /// Claiming ticket
        ticket_id: TicketId,
        /// Its display label
        name: String,
        /// Server-side verdict
        winner: bool,
        /// Numbers the player marked; advisory only
        marked: Vec<u8>,
    },

    /// The session has a winner
    #[serde(rename = "gameover", rename_all = "camelCase")]
    GameOver {
        /// Winning ticket
        ticket_id: TicketId,
        /// Its display label
        name: String,
    },

    /// The readiness gate just became satisfied
    #[serde(rename = "all_ready", rename_all = "camelCase")]
    AllReady {
        /// Declared player count
        expected_player_count: usize,
    },

    /// Drawn numbers and flags were cleared, tickets kept
    #[serde(rename = "reset")]
    Reset,

    /// Everything was cleared, tickets included
    #[serde(rename = "newgame")]
    NewGame,

    /// The pool ran dry
    #[serde(rename = "done")]
    Done {
        /// Every drawn number, in order
        drawn: Vec<u8>,
    },
}

impl SessionEvent {
    /// The `type` tag this event serializes with
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::State(_) => "state",
            Self::Players { .. } => "players",
            Self::Number { .. } => "number",
            Self::Bingo { .. } => "bingo",
            Self::GameOver { .. } => "gameover",
            Self::AllReady { .. } => "all_ready",
            Self::Reset => "reset",
            Self::NewGame => "newgame",
            Self::Done { .. } => "done",
        }
    }
}
