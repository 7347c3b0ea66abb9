//! # Bingo Core
//!
//! Core traits and types for the bingo session server.
//!
//! The server follows a "functional core, imperative shell" split: all game
//! rules live in a [`Reducer`](reducer::Reducer) that mutates owned state and
//! returns a reply plus a list of [`Effect`](effect::Effect) descriptions. The
//! runtime crate owns the state, serializes every reducer call behind a single
//! write lock, and executes the effects.
//!
//! ## Core Concepts
//!
//! - **State**: the single session object (tickets, draw pool, status)
//! - **Action**: every mutating request the session accepts
//! - **Reducer**: `(State, Action, Environment) → (Reply, Effects)`
//! - **Effect**: a description of an event to publish to observers
//! - **Environment**: injected dependencies, here the source of randomness
//!
//! ## Example
//!
//! ```ignore
//! use bingo_core::{effect::Reduction, reducer::Reducer};
//!
//! impl Reducer for SessionReducer {
//!     type State = SessionState;
//!     type Action = SessionAction;
//!     type Reply = Result<SessionReply, BingoError>;
//!     type Event = SessionEvent;
//!     type Environment = SessionEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SessionState,
//!         action: SessionAction,
//!         env: &SessionEnvironment,
//!     ) -> Reduction<Self::Reply, SessionEvent> {
//!         // Game rules go here
//!         Reduction::reply(Ok(SessionReply::Stopped))
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the core trait for business logic
///
/// Reducers are deterministic given their environment: all randomness is
/// pulled through [`NumberSource`](crate::environment::NumberSource), so tests
/// can replay a game exactly.
pub mod reducer {
    use super::effect::Reduction;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Reply`: What the caller of an action gets back
    /// - `Event`: What observers get told about
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The reply handed back to whoever dispatched the action
        type Reply;

        /// The event type carried by [`Effect::Publish`](super::effect::Effect::Publish)
        type Event;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes, a reply and effects
        ///
        /// This function:
        /// 1. Validates the action against current state
        /// 2. Updates state in place
        /// 3. Returns the reply and the effects to be executed, in order
        ///
        /// Effects are built from the post-mutation state, so anything they
        /// carry (snapshots, progress) is already consistent with the reply.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Reduction<Self::Reply, Self::Event>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values. The reducer never touches an observer; it describes
/// what should be published and the runtime does the publishing.
pub mod effect {
    use super::SmallVec;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Event`: The event type observers receive
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Effect<Event> {
        /// Fan an event out to every connected observer
        Publish(Event),
    }

    impl<Event> Effect<Event> {
        /// The event this effect publishes
        #[must_use]
        pub const fn event(&self) -> &Event {
            match self {
                Self::Publish(event) => event,
            }
        }
    }

    /// Result of a single reducer call: the reply plus effects in execution order
    #[derive(Debug)]
    pub struct Reduction<Reply, Event> {
        /// Value returned to the dispatcher
        pub reply: Reply,
        /// Effects to execute, first to last
        pub effects: SmallVec<[Effect<Event>; 4]>,
    }

    impl<Reply, Event> Reduction<Reply, Event> {
        /// A reduction with a reply and no effects
        #[must_use]
        pub fn reply(reply: Reply) -> Self {
            Self {
                reply,
                effects: SmallVec::new(),
            }
        }

        /// Append an event to publish after the ones already queued
        #[must_use]
        pub fn publish(mut self, event: Event) -> Self {
            self.effects.push(Effect::Publish(event));
            self
        }

        /// Events this reduction will publish, in order
        pub fn published(&self) -> impl Iterator<Item = &Event> {
            self.effects.iter().map(Effect::event)
        }
    }
}

/// Environment module - dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected via the
/// reducer's Environment parameter.
pub mod environment {
    use rand::Rng;

    /// Source of uniformly distributed integers
    ///
    /// Every random decision in a game (ticket ids, ticket numbers, draws)
    /// goes through this trait.
    ///
    /// # Examples
    ///
    /// ```
    /// use bingo_core::environment::{NumberSource, SystemRandom};
    ///
    /// let value = SystemRandom.below(75);
    /// assert!(value < 75);
    /// ```
    pub trait NumberSource: Send + Sync {
        /// Returns an integer in `0..bound`, every value equally likely.
        ///
        /// Returns 0 when `bound` is 0.
        fn below(&self, bound: u32) -> u32;
    }

    /// Production number source backed by the thread-local OS-seeded RNG
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemRandom;

    impl NumberSource for SystemRandom {
        fn below(&self, bound: u32) -> u32 {
            if bound == 0 {
                return 0;
            }
            rand::thread_rng().gen_range(0..bound)
        }
    }
}
