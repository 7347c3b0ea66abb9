//! # Bingo Session
//!
//! The session state machine for a single live bingo game.
//!
//! A session holds issued [`Ticket`]s, a [`DrawPool`] of the numbers 1 to 75
//! and a [`SessionStatus`]. Every mutation goes through [`SessionReducer`],
//! which returns a reply for the caller and the [`SessionEvent`]s observers
//! must see, in order.
//!
//! ```text
//!            start                stop
//!   Idle ────────────► Running ─────────► Idle
//!    ▲                   │  │
//!    │ reset / newgame   │  └─ pool drained ─► Idle
//!    │                   ▼
//!    └──────────────── Over  (winning claim)
//! ```
//!
//! Claims are always verified against the server's drawn numbers; whatever
//! the client marked is carried along for display only.

pub mod error;
pub mod events;
pub mod pool;
pub mod progress;
pub mod reducer;
pub mod tickets;
pub mod types;

pub use error::{BingoError, Result};
pub use events::{SessionEvent, StateSnapshot};
pub use pool::DrawPool;
pub use reducer::{SessionAction, SessionEnvironment, SessionReducer, SessionReply, SessionState};
pub use tickets::TicketStore;
pub use types::{PlayerProgress, SessionStatus, Ticket, TicketId};
