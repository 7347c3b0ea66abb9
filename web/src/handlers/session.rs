//! Session endpoints.
//!
//! Each handler turns a request into one [`SessionAction`], sends it through
//! the store and shapes the reply. Soft refusals (not running, readiness gate
//! closed, game over, pool empty) answer 200 with an `ok:false` or
//! `done:true` body; only lookup and validation failures become errors.

use crate::error::AppError;
use crate::extractors::TicketPath;
use crate::state::AppState;
use crate::WebResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use bingo_session::{
    BingoError, PlayerProgress, SessionAction, SessionEvent, SessionReply, Ticket, TicketId,
};
use serde::{Deserialize, Serialize};

/// `POST /session/ticket` body
#[derive(Debug, Default, Deserialize)]
pub struct IssueTicketRequest {
    /// Optional display label
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /session/tickets/bulk` body
#[derive(Debug, Deserialize)]
pub struct IssueBulkRequest {
    /// One ticket per non-blank name
    pub names: Vec<String>,
}

/// `POST /session/bingo/{id}` body
#[derive(Debug, Default, Deserialize)]
pub struct BingoRequest {
    /// Numbers the player marked
    #[serde(default)]
    pub marked: Vec<u8>,
}

/// An issued ticket
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTicket {
    /// New ticket id
    pub ticket_id: TicketId,
    /// Display label
    pub name: String,
}

impl From<Ticket> for IssuedTicket {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            name: ticket.name,
        }
    }
}

/// Generic acknowledgement
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    /// Whether the action took effect
    pub ok: bool,
    /// Readiness gate state, on ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_ready: Option<bool>,
    /// Why a start was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Set when a start was refused because the game is over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_over: Option<bool>,
}

impl Ack {
    const fn ok() -> Self {
        Self {
            ok: true,
            all_ready: None,
            reason: None,
            game_over: None,
        }
    }

    const fn refused() -> Self {
        Self {
            ok: false,
            all_ready: None,
            reason: None,
            game_over: None,
        }
    }
}

/// `GET /session/draw` response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DrawResponse {
    /// A number was drawn
    Drawn {
        /// The number just drawn
        number: u8,
        /// Every drawn number, in order
        drawn: Vec<u8>,
        /// Per-ticket progress
        players: Vec<PlayerProgress>,
    },
    /// Nothing left to draw
    Done {
        /// Always `true`
        done: bool,
    },
    /// Session not running
    Refused {
        /// Always `false`
        ok: bool,
    },
}

/// `POST /session/bingo/{id}` response
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    /// Server-side verdict
    pub winner: bool,
}

fn unexpected(reply: &SessionReply) -> AppError {
    AppError::internal(format!("Unexpected session reply: {reply:?}"))
}

/// Issue one ticket.
///
/// The body is optional; a missing or unreadable body issues a ticket with
/// the default name.
///
/// # Errors
///
/// Returns 409 when every ticket id is taken, 503 during shutdown.
pub async fn issue_ticket(
    State(state): State<AppState>,
    body: Option<Json<IssueTicketRequest>>,
) -> WebResult<Json<IssuedTicket>> {
    let name = body.and_then(|Json(request)| request.name);
    match state.store.send(SessionAction::IssueTicket { name }).await?? {
        SessionReply::TicketIssued(ticket) => Ok(Json(ticket.into())),
        other => Err(unexpected(&other)),
    }
}

/// Replace every ticket with one per name and declare the player count.
///
/// # Errors
///
/// Returns 400 when `names` is missing, not an array, empty or all blank.
pub async fn issue_bulk(
    State(state): State<AppState>,
    body: Result<Json<IssueBulkRequest>, JsonRejection>,
) -> WebResult<Json<Vec<IssuedTicket>>> {
    let Json(IssueBulkRequest { names }) = body?;
    match state.store.send(SessionAction::IssueBulk { names }).await?? {
        SessionReply::TicketsIssued(tickets) => {
            Ok(Json(tickets.into_iter().map(IssuedTicket::from).collect()))
        }
        other => Err(unexpected(&other)),
    }
}

/// Fetch a ticket.
///
/// # Errors
///
/// Returns 404 for an unknown or malformed id.
pub async fn get_ticket(
    State(state): State<AppState>,
    TicketPath(id): TicketPath,
) -> WebResult<Json<Ticket>> {
    let ticket = state
        .store
        .state(|session| session.tickets.get(id).cloned())
        .await?;
    Ok(Json(ticket))
}

/// Mark a ticket ready.
///
/// # Errors
///
/// Returns 404 for an unknown or malformed id.
pub async fn mark_ready(
    State(state): State<AppState>,
    TicketPath(id): TicketPath,
) -> WebResult<Json<Ack>> {
    match state.store.send(SessionAction::MarkReady { id }).await?? {
        SessionReply::Ready { all_ready } => Ok(Json(Ack {
            all_ready: Some(all_ready),
            ..Ack::ok()
        })),
        other => Err(unexpected(&other)),
    }
}

/// Start drawing.
///
/// # Errors
///
/// Returns 503 during shutdown.
pub async fn start(State(state): State<AppState>) -> WebResult<Json<Ack>> {
    match state.store.send(SessionAction::Start).await? {
        Ok(_) => Ok(Json(Ack::ok())),
        Err(BingoError::NotAllReady) => Ok(Json(Ack {
            reason: Some("not_all_ready"),
            ..Ack::refused()
        })),
        Err(BingoError::GameOver) => Ok(Json(Ack {
            game_over: Some(true),
            ..Ack::refused()
        })),
        Err(other) => Err(other.into()),
    }
}

/// Stop drawing.
///
/// # Errors
///
/// Returns 503 during shutdown.
pub async fn stop(State(state): State<AppState>) -> WebResult<Json<Ack>> {
    state.store.send(SessionAction::Stop).await??;
    Ok(Json(Ack::ok()))
}

/// Draw the next number.
///
/// # Errors
///
/// Returns 503 during shutdown.
pub async fn draw(State(state): State<AppState>) -> WebResult<Json<DrawResponse>> {
    match state.store.send(SessionAction::Draw).await? {
        Ok(SessionReply::Drawn {
            number,
            drawn,
            players,
        }) => Ok(Json(DrawResponse::Drawn {
            number,
            drawn,
            players,
        })),
        Ok(other) => Err(unexpected(&other)),
        Err(BingoError::NotRunning) => Ok(Json(DrawResponse::Refused { ok: false })),
        Err(BingoError::Exhausted) => Ok(Json(DrawResponse::Done { done: true })),
        Err(other) => Err(other.into()),
    }
}

/// Claim bingo; the verdict is computed from the server's drawn numbers.
///
/// # Errors
///
/// Returns 404 for an unknown or malformed id.
pub async fn submit_bingo(
    State(state): State<AppState>,
    TicketPath(id): TicketPath,
    body: Option<Json<BingoRequest>>,
) -> WebResult<Json<ClaimResponse>> {
    let marked = body.map(|Json(request)| request.marked).unwrap_or_default();
    match state.store.send(SessionAction::SubmitBingo { id, marked }).await?? {
        SessionReply::Claim { winner } => Ok(Json(ClaimResponse { winner })),
        other => Err(unexpected(&other)),
    }
}

/// Clear draws and flags, keep tickets.
///
/// # Errors
///
/// Returns 503 during shutdown.
pub async fn reset(State(state): State<AppState>) -> WebResult<Json<Ack>> {
    state.store.send(SessionAction::Reset).await??;
    Ok(Json(Ack::ok()))
}

/// Clear everything.
///
/// # Errors
///
/// Returns 503 during shutdown.
pub async fn new_game(State(state): State<AppState>) -> WebResult<Json<Ack>> {
    state.store.send(SessionAction::NewGame).await??;
    Ok(Json(Ack::ok()))
}

/// Current session view, shaped like the `state` push event.
pub async fn snapshot(State(state): State<AppState>) -> Json<SessionEvent> {
    Json(state.store.state(bingo_session::SessionState::state_event).await)
}
