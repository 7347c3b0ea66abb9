//! Progress projection: per-ticket hits derived from tickets and the draw pool.
//!
//! Always computed fresh from current state; nothing here is cached.

use crate::pool::DrawPool;
use crate::tickets::TicketStore;
use crate::types::{PlayerProgress, TICKET_SIZE};

/// Project every ticket's progress, in ascending id order
#[must_use]
pub fn project(tickets: &TicketStore, pool: &DrawPool) -> Vec<PlayerProgress> {
    tickets
        .iter()
        .map(|ticket| {
            let hits = pool.hits(ticket.numbers());
            PlayerProgress {
                id: ticket.id,
                name: ticket.name.clone(),
                hits,
                total: TICKET_SIZE,
                progress_percent: percent(hits, TICKET_SIZE),
                ready: ticket.ready,
                winner: ticket.winner,
            }
        })
        .collect()
}

/// `round(100 * hits / total)`, halves rounded up
#[must_use]
pub fn percent(hits: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * hits.min(total) + total) / (2 * total);
    // hits <= total, so rounded <= 100
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
#[allow(clippy::panic)] // Test code can panic
mod tests {
    use super::*;
    use bingo_testing::{ScriptedRandom, SeededRandom};

    #[test]
    fn percent_rounding() {
        assert_eq!(percent(0, 15), 0);
        assert_eq!(percent(1, 15), 7);
        assert_eq!(percent(2, 15), 13);
        assert_eq!(percent(7, 15), 47);
        assert_eq!(percent(8, 15), 53);
        assert_eq!(percent(15, 15), 100);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(3, 0), 0);
    }

    #[test]
    fn projection_counts_hits() {
        let mut tickets = TicketStore::new();
        let rng = SeededRandom::new(11);
        let ticket = tickets.issue(Some("A"), &rng).unwrap_or_else(|e| panic!("{e}"));
        let _ = tickets.mark_ready(ticket.id);

        let mut pool = DrawPool::new();
        let zeros = ScriptedRandom::zeros();
        while !pool.covers(ticket.numbers()) {
            let _ = pool.draw(&zeros);
        }

        let rows = project(&tickets, &pool);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, ticket.id);
        assert_eq!(rows[0].hits, 15);
        assert_eq!(rows[0].total, 15);
        assert_eq!(rows[0].progress_percent, 100);
        assert!(rows[0].ready);
        assert!(!rows[0].winner);
    }

    #[test]
    fn projection_tracks_pool_changes() {
        let mut tickets = TicketStore::new();
        let rng = SeededRandom::new(12);
        let _ = tickets.issue(None, &rng);
        let _ = tickets.issue(None, &rng);

        let pool = DrawPool::new();
        let rows = project(&tickets, &pool);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.hits == 0 && r.progress_percent == 0));
        assert!(rows[0].id < rows[1].id);
    }
}
