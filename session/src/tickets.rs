//! The ticket store: issued tickets and the expected player count.

use crate::error::{BingoError, Result};
use crate::types::{Ticket, TicketId, MAX_NUMBER, MAX_TICKET_ID, MIN_TICKET_ID, TICKET_SIZE};
use bingo_core::environment::NumberSource;
use std::collections::BTreeMap;

/// How many distinct five-digit ids exist
const ID_SPACE: usize = (MAX_TICKET_ID - MIN_TICKET_ID + 1) as usize;

/// Issued tickets, keyed (and therefore listed) by ascending id
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketStore {
    tickets: BTreeMap<TicketId, Ticket>,
    expected_player_count: usize,
}

impl TicketStore {
    /// An empty store with no expectation declared
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue one ticket
    ///
    /// Blank or missing names fall back to `"Player <id>"`.
    ///
    /// # Errors
    ///
    /// Returns [`BingoError::TicketIdsExhausted`] if every five-digit id is in use.
    pub fn issue(&mut self, name: Option<&str>, rng: &dyn NumberSource) -> Result<Ticket> {
        let id = self.fresh_id(rng)?;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| Ticket::default_name(id), str::to_string);

        let ticket = Ticket::new(id, name, deal_numbers(rng));
        self.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    /// Replace every ticket with one per non-blank name
    ///
    /// The expected player count becomes the number of tickets issued. The
    /// store is left untouched when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`BingoError::InvalidInput`] when `names` is empty or every
    /// name is blank.
    pub fn issue_bulk(&mut self, names: &[String], rng: &dyn NumberSource) -> Result<Vec<Ticket>> {
        let names: Vec<&str> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            return Err(BingoError::InvalidInput(
                "names must contain at least one non-blank name".to_string(),
            ));
        }
        if names.len() > ID_SPACE {
            return Err(BingoError::TicketIdsExhausted);
        }

        self.clear_all();
        let tickets = names
            .into_iter()
            .map(|name| self.issue(Some(name), rng))
            .collect::<Result<Vec<_>>>()?;
        self.expected_player_count = tickets.len();
        Ok(tickets)
    }

    /// Mark a ticket ready
    ///
    /// # Errors
    ///
    /// Returns [`BingoError::NotFound`] for an unknown id.
    pub fn mark_ready(&mut self, id: TicketId) -> Result<()> {
        let ticket = self.tickets.get_mut(&id).ok_or(BingoError::NotFound(id))?;
        ticket.ready = true;
        Ok(())
    }

    /// Flag a ticket as a verified winner
    ///
    /// # Errors
    ///
    /// Returns [`BingoError::NotFound`] for an unknown id.
    pub fn mark_winner(&mut self, id: TicketId) -> Result<()> {
        let ticket = self.tickets.get_mut(&id).ok_or(BingoError::NotFound(id))?;
        ticket.winner = true;
        Ok(())
    }

    /// Look up a ticket
    ///
    /// # Errors
    ///
    /// Returns [`BingoError::NotFound`] for an unknown id.
    pub fn get(&self, id: TicketId) -> Result<&Ticket> {
        self.tickets.get(&id).ok_or(BingoError::NotFound(id))
    }

    /// Drop every ticket and forget the expected player count
    pub fn clear_all(&mut self) {
        self.tickets.clear();
        self.expected_player_count = 0;
    }

    /// Keep tickets but clear every ready and winner flag
    pub fn reset_flags(&mut self) {
        for ticket in self.tickets.values_mut() {
            ticket.ready = false;
            ticket.winner = false;
        }
    }

    /// Readiness gate
    ///
    /// Satisfied only when an expectation was declared, at least that many
    /// tickets exist, and every ticket is ready.
    #[must_use]
    pub fn readiness_gate(&self) -> bool {
        self.expected_player_count > 0
            && self.tickets.len() >= self.expected_player_count
            && self.tickets.values().all(|t| t.ready)
    }

    /// Whether the session may start as far as readiness is concerned
    ///
    /// With no expectation declared there is nothing to wait for.
    #[must_use]
    pub fn may_start(&self) -> bool {
        self.expected_player_count == 0 || self.readiness_gate()
    }

    /// Expected player count (0 when none was declared)
    #[must_use]
    pub const fn expected_player_count(&self) -> usize {
        self.expected_player_count
    }

    /// Tickets in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }

    /// Number of issued tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// No tickets issued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Pick an id not held by any active ticket
    fn fresh_id(&self, rng: &dyn NumberSource) -> Result<TicketId> {
        if self.tickets.len() >= ID_SPACE {
            return Err(BingoError::TicketIdsExhausted);
        }
        loop {
            let id = TicketId::new(MIN_TICKET_ID + rng.below(MAX_TICKET_ID - MIN_TICKET_ID + 1));
            if !self.tickets.contains_key(&id) {
                return Ok(id);
            }
            tracing::debug!(%id, "Ticket id collision, retrying");
        }
    }
}

/// 15 distinct numbers from `1..=75`, uniformly, via a partial Fisher-Yates shuffle
fn deal_numbers(rng: &dyn NumberSource) -> Vec<u8> {
    let mut deck: Vec<u8> = (1..=MAX_NUMBER).collect();
    for i in 0..TICKET_SIZE {
        // deck.len() <= 75, the casts cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let j = i + rng.below((deck.len() - i) as u32) as usize;
        let last = deck.len() - 1;
        deck.swap(i, j.min(last));
    }
    deck.truncate(TICKET_SIZE);
    deck
}

#[cfg(test)]
#[allow(clippy::panic)] // Test code can panic
mod tests {
    use super::*;
    use bingo_testing::{ScriptedRandom, SeededRandom};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn issue_defaults_name() {
        let mut store = TicketStore::new();
        let rng = SeededRandom::new(1);
        let ticket = store.issue(None, &rng).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(ticket.name, format!("Player {}", ticket.id));

        let blank = store.issue(Some("   "), &rng).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(blank.name, format!("Player {}", blank.id));

        let named = store.issue(Some("  Maria "), &rng).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(named.name, "Maria");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn id_collision_retries() {
        let mut store = TicketStore::new();
        // First ticket takes id offset 0; the second draws 0 again, then 5.
        let rng = ScriptedRandom::new(vec![0; 16].into_iter().chain([0, 5]).chain(vec![0; 15]).collect());
        let first = store.issue(None, &rng).unwrap_or_else(|e| panic!("{e}"));
        let second = store.issue(None, &rng).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(first.id, TicketId::new(10_000));
        assert_eq!(second.id, TicketId::new(10_005));
    }

    #[test]
    fn bulk_replaces_and_sets_expectation() {
        let mut store = TicketStore::new();
        let rng = SeededRandom::new(2);
        let _ = store.issue(Some("old"), &rng);

        let tickets = store
            .issue_bulk(&names(&["A", " ", "B", ""]), &rng)
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(tickets.len(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.expected_player_count(), 2);
        assert!(store.iter().all(|t| t.name == "A" || t.name == "B"));
    }

    #[test]
    fn bulk_rejects_blank_without_clearing() {
        let mut store = TicketStore::new();
        let rng = SeededRandom::new(3);
        let _ = store.issue(Some("keep"), &rng);

        assert!(matches!(
            store.issue_bulk(&names(&[" ", ""]), &rng),
            Err(BingoError::InvalidInput(_))
        ));
        assert!(matches!(
            store.issue_bulk(&[], &rng),
            Err(BingoError::InvalidInput(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn mark_ready_unknown() {
        let mut store = TicketStore::new();
        let id = TicketId::new(11_111);
        assert_eq!(store.mark_ready(id), Err(BingoError::NotFound(id)));
        assert!(store.get(id).is_err());
    }

    #[test]
    fn readiness_gate_rules() {
        let mut store = TicketStore::new();
        let rng = SeededRandom::new(4);

        // No expectation: gate never satisfied, start allowed
        let lone = store.issue(None, &rng).unwrap_or_else(|e| panic!("{e}"));
        let _ = store.mark_ready(lone.id);
        assert!(!store.readiness_gate());
        assert!(store.may_start());

        let tickets = store
            .issue_bulk(&names(&["A", "B", "C"]), &rng)
            .unwrap_or_else(|e| panic!("{e}"));
        let _ = store.mark_ready(tickets[0].id);
        let _ = store.mark_ready(tickets[1].id);
        assert!(!store.readiness_gate());
        assert!(!store.may_start());

        let _ = store.mark_ready(tickets[2].id);
        assert!(store.readiness_gate());
        assert!(store.may_start());
    }

    #[test]
    fn reset_flags_keeps_tickets() {
        let mut store = TicketStore::new();
        let rng = SeededRandom::new(5);
        let ticket = store.issue(Some("A"), &rng).unwrap_or_else(|e| panic!("{e}"));
        let _ = store.mark_ready(ticket.id);
        let _ = store.mark_winner(ticket.id);

        store.reset_flags();

        let kept = store.get(ticket.id).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(kept.name, "A");
        assert_eq!(kept.numbers(), ticket.numbers());
        assert!(!kept.ready);
        assert!(!kept.winner);
    }

    #[test]
    fn clear_all_forgets_expectation() {
        let mut store = TicketStore::new();
        let rng = SeededRandom::new(6);
        let _ = store.issue_bulk(&names(&["A"]), &rng);
        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.expected_player_count(), 0);
    }

    proptest! {
        #[test]
        fn tickets_have_fifteen_distinct_numbers(seed in any::<u64>()) {
            let mut store = TicketStore::new();
            let rng = SeededRandom::new(seed);
            for _ in 0..20 {
                let ticket = store.issue(None, &rng);
                prop_assert!(ticket.is_ok());
            }
            let mut ids = HashSet::new();
            for ticket in store.iter() {
                let unique: HashSet<u8> = ticket.numbers().iter().copied().collect();
                prop_assert_eq!(unique.len(), 15);
                prop_assert!(ticket.numbers().iter().all(|n| (1..=75).contains(n)));
                prop_assert!((10_000..=99_999).contains(&ticket.id.get()));
                prop_assert!(ids.insert(ticket.id));
            }
        }
    }
}
