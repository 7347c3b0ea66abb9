//! Session controller: the reducer that owns every game rule.
//!
//! Each action mutates [`SessionState`], then builds its broadcast events from
//! the post-mutation state. The runtime applies reducers one at a time, so
//! every event reflects exactly the mutation that produced it.

use crate::error::{BingoError, Result};
use crate::events::{SessionEvent, StateSnapshot};
use crate::pool::DrawPool;
use crate::progress;
use crate::tickets::TicketStore;
use crate::types::{PlayerProgress, SessionStatus, Ticket, TicketId};
use bingo_core::{effect::Reduction, environment::NumberSource, reducer::Reducer};
use std::sync::Arc;

/// The single session: tickets, draw pool and status
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Issued tickets
    pub tickets: TicketStore,
    /// Undrawn and drawn numbers
    pub pool: DrawPool,
    /// Session status
    pub status: SessionStatus,
}

impl SessionState {
    /// A fresh idle session with no tickets
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh per-ticket progress
    #[must_use]
    pub fn progress(&self) -> Vec<PlayerProgress> {
        progress::project(&self.tickets, &self.pool)
    }

    /// Full view of the session
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            status: self.status,
            drawn: self.pool.drawn().to_vec(),
            players: self.progress(),
            game_over: self.status == SessionStatus::Over,
            expected_player_count: self.tickets.expected_player_count(),
        }
    }

    /// The `state` event sent to a newly connected observer
    #[must_use]
    pub fn state_event(&self) -> SessionEvent {
        SessionEvent::State(self.snapshot())
    }

    fn players_event(&self) -> SessionEvent {
        SessionEvent::Players {
            players: self.progress(),
            expected_player_count: self.tickets.expected_player_count(),
        }
    }
}

/// Every mutating request the session accepts
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// Issue one ticket
    IssueTicket {
        /// Optional display label
        name: Option<String>,
    },
    /// Replace all tickets with one per name and declare the player count
    IssueBulk {
        /// Player names; blanks are skipped
        names: Vec<String>,
    },
    /// Mark a ticket ready
    MarkReady {
        /// Ticket to mark
        id: TicketId,
    },
    /// Start drawing
    Start,
    /// Pause drawing
    Stop,
    /// Draw the next number
    Draw,
    /// A player claims bingo
    SubmitBingo {
        /// Claiming ticket
        id: TicketId,
        /// What the client marked; advisory only
        marked: Vec<u8>,
    },
    /// Clear draws and flags, keep tickets
    Reset,
    /// Clear everything
    NewGame,
}

/// Successful answers, one per action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionReply {
    /// Answer to [`SessionAction::IssueTicket`]
    TicketIssued(Ticket),
    /// Answer to [`SessionAction::IssueBulk`]
    TicketsIssued(Vec<Ticket>),
    /// Answer to [`SessionAction::MarkReady`]
    Ready {
        /// Readiness gate satisfied after this mark
        all_ready: bool,
    },
    /// Answer to [`SessionAction::Start`]
    Started,
    /// Answer to [`SessionAction::Stop`]
    Stopped,
    /// Answer to [`SessionAction::Draw`]
    Drawn {
        /// The number just drawn
        number: u8,
        /// Every drawn number, in order
        drawn: Vec<u8>,
        /// Per-ticket progress after the draw
        players: Vec<PlayerProgress>,
    },
    /// Answer to [`SessionAction::SubmitBingo`]
    Claim {
        /// Server-side verdict
        winner: bool,
    },
    /// Answer to [`SessionAction::Reset`]
    Reset,
    /// Answer to [`SessionAction::NewGame`]
    NewGame,
}

/// Environment dependencies for the session reducer
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Randomness for ticket ids, ticket numbers and draws
    pub rng: Arc<dyn NumberSource>,
}

impl SessionEnvironment {
    /// Creates a new `SessionEnvironment`
    #[must_use]
    pub fn new(rng: Arc<dyn NumberSource>) -> Self {
        Self { rng }
    }
}

impl std::fmt::Debug for SessionEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEnvironment").finish_non_exhaustive()
    }
}

type SessionReduction = Reduction<Result<SessionReply>, SessionEvent>;

/// Reducer for the bingo session
#[derive(Clone, Debug, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn issue_ticket(state: &mut SessionState, name: Option<&str>, env: &SessionEnvironment) -> SessionReduction {
        match state.tickets.issue(name, env.rng.as_ref()) {
            Ok(ticket) => {
                metrics::counter!("bingo_tickets_issued_total").increment(1);
                tracing::info!(id = %ticket.id, name = %ticket.name, "Ticket issued");
                Reduction::reply(Ok(SessionReply::TicketIssued(ticket))).publish(state.players_event())
            }
            Err(error) => Reduction::reply(Err(error)),
        }
    }

    fn issue_bulk(state: &mut SessionState, names: &[String], env: &SessionEnvironment) -> SessionReduction {
        match state.tickets.issue_bulk(names, env.rng.as_ref()) {
            Ok(tickets) => {
                metrics::counter!("bingo_tickets_issued_total").increment(tickets.len() as u64);
                tracing::info!(count = tickets.len(), "Tickets issued in bulk, expectation declared");
                Reduction::reply(Ok(SessionReply::TicketsIssued(tickets))).publish(state.players_event())
            }
            Err(error) => Reduction::reply(Err(error)),
        }
    }

    fn mark_ready(state: &mut SessionState, id: TicketId) -> SessionReduction {
        let was_ready = state.tickets.readiness_gate();
        if let Err(error) = state.tickets.mark_ready(id) {
            return Reduction::reply(Err(error));
        }
        let all_ready = state.tickets.readiness_gate();

        let reduction =
            Reduction::reply(Ok(SessionReply::Ready { all_ready })).publish(state.players_event());
        if all_ready && !was_ready {
            tracing::info!(
                players = state.tickets.expected_player_count(),
                "All players ready"
            );
            return reduction.publish(SessionEvent::AllReady {
                expected_player_count: state.tickets.expected_player_count(),
            });
        }
        reduction
    }

    fn start(state: &mut SessionState) -> SessionReduction {
        if state.status == SessionStatus::Over {
            return Reduction::reply(Err(BingoError::GameOver));
        }
        if !state.tickets.may_start() {
            tracing::debug!(
                tickets = state.tickets.len(),
                expected = state.tickets.expected_player_count(),
                "Start rejected, players not ready"
            );
            return Reduction::reply(Err(BingoError::NotAllReady));
        }
        if state.status != SessionStatus::Running {
            state.status = SessionStatus::Running;
            tracing::info!("Session started");
        }
        Reduction::reply(Ok(SessionReply::Started))
    }

    /// Only a running session stops; `Over` holds until reset or new game.
    fn stop(state: &mut SessionState) -> SessionReduction {
        if state.status == SessionStatus::Running {
            state.status = SessionStatus::Idle;
            tracing::info!(drawn = state.pool.drawn().len(), "Session stopped");
        }
        Reduction::reply(Ok(SessionReply::Stopped))
    }

    fn draw(state: &mut SessionState, env: &SessionEnvironment) -> SessionReduction {
        if state.status != SessionStatus::Running {
            return Reduction::reply(Err(BingoError::NotRunning));
        }

        let number = match state.pool.draw(env.rng.as_ref()) {
            Ok(number) => number,
            Err(error) => {
                state.status = SessionStatus::Idle;
                return Reduction::reply(Err(error)).publish(SessionEvent::Done {
                    drawn: state.pool.drawn().to_vec(),
                });
            }
        };

        metrics::counter!("bingo_numbers_drawn_total").increment(1);
        tracing::debug!(number, remaining = state.pool.remaining_len(), "Number drawn");

        let drawn = state.pool.drawn().to_vec();
        let players = state.progress();
        let reduction = Reduction::reply(Ok(SessionReply::Drawn {
            number,
            drawn: drawn.clone(),
            players: players.clone(),
        }))
        .publish(SessionEvent::Number {
            number,
            drawn: drawn.clone(),
            players,
        });

        if state.pool.is_exhausted() {
            state.status = SessionStatus::Idle;
            tracing::info!("Every number drawn, session idle");
            return reduction.publish(SessionEvent::Done { drawn });
        }
        reduction
    }

    fn submit_bingo(state: &mut SessionState, id: TicketId, marked: Vec<u8>) -> SessionReduction {
        let (name, winner) = match state.tickets.get(id) {
            Ok(ticket) => (ticket.name.clone(), state.pool.covers(ticket.numbers())),
            Err(error) => return Reduction::reply(Err(error)),
        };

        let unconfirmed = marked.iter().filter(|&&n| !state.pool.has_drawn(n)).count();
        if unconfirmed > 0 {
            tracing::debug!(%id, unconfirmed, "Claim marks numbers that were never drawn");
        }
        metrics::counter!(
            "bingo_claims_total",
            "result" => if winner { "win" } else { "reject" }
        )
        .increment(1);

        let reduction = Reduction::reply(Ok(SessionReply::Claim { winner })).publish(SessionEvent::Bingo {
            ticket_id: id,
            name: name.clone(),
            winner,
            marked,
        });
        if !winner {
            return reduction;
        }

        if let Err(error) = state.tickets.mark_winner(id) {
            return Reduction::reply(Err(error));
        }
        let reduction = reduction.publish(state.players_event());

        if state.status == SessionStatus::Over {
            return reduction;
        }
        state.status = SessionStatus::Over;
        metrics::counter!("bingo_games_won_total").increment(1);
        tracing::info!(%id, %name, drawn = state.pool.drawn().len(), "Bingo confirmed, game over");
        reduction.publish(SessionEvent::GameOver { ticket_id: id, name })
    }

    fn reset(state: &mut SessionState) -> SessionReduction {
        state.pool.reset();
        state.tickets.reset_flags();
        state.status = SessionStatus::Idle;
        tracing::info!(tickets = state.tickets.len(), "Session reset, players kept");
        Reduction::reply(Ok(SessionReply::Reset))
            .publish(SessionEvent::Reset)
            .publish(state.players_event())
    }

    fn new_game(state: &mut SessionState) -> SessionReduction {
        state.pool.reset();
        state.tickets.clear_all();
        state.status = SessionStatus::Idle;
        tracing::info!("New game, all tickets cleared");
        Reduction::reply(Ok(SessionReply::NewGame)).publish(SessionEvent::NewGame)
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Reply = Result<SessionReply>;
    type Event = SessionEvent;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SessionReduction {
        match action {
            SessionAction::IssueTicket { name } => Self::issue_ticket(state, name.as_deref(), env),
            SessionAction::IssueBulk { names } => Self::issue_bulk(state, &names, env),
            SessionAction::MarkReady { id } => Self::mark_ready(state, id),
            SessionAction::Start => Self::start(state),
            SessionAction::Stop => Self::stop(state),
            SessionAction::Draw => Self::draw(state, env),
            SessionAction::SubmitBingo { id, marked } => Self::submit_bingo(state, id, marked),
            SessionAction::Reset => Self::reset(state),
            SessionAction::NewGame => Self::new_game(state),
        }
    }
}
