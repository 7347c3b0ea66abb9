//! # Bingo Testing
//!
//! Testing utilities and helpers for the bingo session server.
//!
//! This crate provides:
//! - Deterministic [`NumberSource`] implementations so games can be replayed
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use bingo_testing::{seeded, ReducerTest};
//!
//! ReducerTest::new(SessionReducer::new())
//!     .with_env(SessionEnvironment::new(seeded(7)))
//!     .given_state(SessionState::new())
//!     .when_action(SessionAction::Start)
//!     .then_state(|state| assert_eq!(state.status, SessionStatus::Running))
//!     .run();
//! ```

use bingo_core::environment::NumberSource;
use std::sync::Arc;


/// Deterministic number sources
pub mod mocks {
    use super::NumberSource;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::sync::{Mutex, PoisonError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Seeded RNG: same seed, same game
    ///
    /// # Example
    ///
    /// ```
    /// use bingo_testing::mocks::SeededRandom;
    /// use bingo_core::environment::NumberSource;
    ///
    /// let a = SeededRandom::new(42);
    /// let b = SeededRandom::new(42);
    /// assert_eq!(a.below(75), b.below(75));
    /// ```
    #[derive(Debug)]
    pub struct SeededRandom {
        rng: Mutex<StdRng>,
    }

    impl SeededRandom {
        /// Create a source seeded with `seed`
        #[must_use]
        pub fn new(seed: u64) -> Self {
            Self {
                rng: Mutex::new(StdRng::seed_from_u64(seed)),
            }
        }
    }

    impl NumberSource for SeededRandom {
        fn below(&self, bound: u32) -> u32 {
            if bound == 0 {
                return 0;
            }
            self.rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(0..bound)
        }
    }

    /// Replays a fixed script of values, cycling when it runs out
    ///
    /// Each value is reduced modulo the requested bound, so a script of
    /// zeros always picks the first candidate.
    #[derive(Debug)]
    pub struct ScriptedRandom {
        script: Vec<u32>,
        cursor: AtomicUsize,
    }

    impl ScriptedRandom {
        /// Create a source that yields `script` in order
        #[must_use]
        pub fn new(script: Vec<u32>) -> Self {
            Self {
                script,
                cursor: AtomicUsize::new(0),
            }
        }

        /// A source that always answers 0
        #[must_use]
        pub fn zeros() -> Self {
            Self::new(vec![0])
        }
    }

    impl NumberSource for ScriptedRandom {
        fn below(&self, bound: u32) -> u32 {
            if bound == 0 || self.script.is_empty() {
                return 0;
            }
            let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.script.len();
            self.script[index] % bound
        }
    }
}

pub use mocks::{ScriptedRandom, SeededRandom};
pub use reducer_test::{assertions, ReducerTest};

/// Shared seeded source, ready to drop into an environment
#[must_use]
pub fn seeded(seed: u64) -> Arc<dyn NumberSource> {
    Arc::new(SeededRandom::new(seed))
}
