//! The draw pool: undrawn numbers and the drawn sequence.

use crate::error::{BingoError, Result};
use crate::types::MAX_NUMBER;
use bingo_core::environment::NumberSource;

/// Undrawn numbers plus the ordered sequence of drawn ones
///
/// `remaining` and `drawn` always partition `1..=75`. A bitmask mirrors
/// `drawn` for constant-time membership checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawPool {
    remaining: Vec<u8>,
    drawn: Vec<u8>,
    drawn_mask: u128,
}

impl Default for DrawPool {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawPool {
    /// A full pool, nothing drawn
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: (1..=MAX_NUMBER).collect(),
            drawn: Vec::with_capacity(usize::from(MAX_NUMBER)),
            drawn_mask: 0,
        }
    }

    /// Extract one remaining number, every candidate equally likely
    ///
    /// # Errors
    ///
    /// Returns [`BingoError::Exhausted`] when nothing is left to draw.
    pub fn draw(&mut self, rng: &dyn NumberSource) -> Result<u8> {
        if self.remaining.is_empty() {
            return Err(BingoError::Exhausted);
        }

        // remaining.len() <= 75, the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let index = rng.below(self.remaining.len() as u32) as usize;
        let number = self.remaining.swap_remove(index.min(self.remaining.len() - 1));

        self.drawn.push(number);
        self.drawn_mask |= 1u128 << number;
        Ok(number)
    }

    /// Put every number back
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Drawn numbers in draw order
    #[must_use]
    pub fn drawn(&self) -> &[u8] {
        &self.drawn
    }

    /// Whether `number` has been drawn
    #[must_use]
    pub const fn has_drawn(&self, number: u8) -> bool {
        number >= 1 && number <= MAX_NUMBER && self.drawn_mask & (1u128 << number) != 0
    }

    /// Whether every one of `numbers` has been drawn
    #[must_use]
    pub fn covers(&self, numbers: &[u8]) -> bool {
        numbers.iter().all(|&n| self.has_drawn(n))
    }

    /// How many of `numbers` have been drawn
    #[must_use]
    pub fn hits(&self, numbers: &[u8]) -> usize {
        numbers.iter().filter(|&&n| self.has_drawn(n)).count()
    }

    /// Numbers still in the pool
    #[must_use]
    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    /// Nothing left to draw
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }
}
