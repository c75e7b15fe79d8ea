//! In-flight score adjustments per team.
//!
//! A ledger belongs to one session. The displayed score is the last confirmed server
//! score plus every delta still in flight. A failed delta is rolled back on its own;
//! the others stay applied.

use crate::models::TeamId;
use std::collections::HashMap;

/// Handle for one in-flight delta.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PendingDelta {
    pub team_id: TeamId,
    pub delta: i64,
    seq: u64,
}

#[derive(Debug, Default)]
struct TeamEntry {
    confirmed: i64,
    in_flight: Vec<(u64, i64)>,
    /// Server score from the most recently issued delta confirmed so far.
    newest_reply: Option<(u64, i64)>,
}

#[derive(Debug, Default)]
pub struct ScoreLedger {
    teams: HashMap<TeamId, TeamEntry>,
    next_seq: u64,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an optimistic delta. `confirmed` seeds the team the first time it is seen.
    pub fn begin(&mut self, team_id: TeamId, confirmed: i64, delta: i64) -> PendingDelta {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = self.teams.entry(team_id).or_insert_with(|| TeamEntry {
            confirmed,
            in_flight: Vec::new(),
            newest_reply: None,
        });
        entry.in_flight.push((seq, delta));
        PendingDelta {
            team_id,
            delta,
            seq,
        }
    }

    /// Score to show: confirmed plus everything in flight.
    pub fn displayed(&self, team_id: TeamId) -> Option<i64> {
        self.teams
            .get(&team_id)
            .map(|e| e.confirmed + e.in_flight.iter().map(|(_, d)| d).sum::<i64>())
    }

    /// Number of deltas not yet confirmed or rolled back for this team.
    pub fn in_flight(&self, team_id: TeamId) -> usize {
        self.teams.get(&team_id).map_or(0, |e| e.in_flight.len())
    }

    /// The server applied `ticket` and reports `server_score`, which includes it.
    ///
    /// Replies can arrive out of order, so the server value only becomes the base once
    /// nothing is in flight, and only the reply to the latest delta is trusted.
    pub fn confirm(&mut self, ticket: PendingDelta, server_score: i64) {
        let Some(entry) = self.teams.get_mut(&ticket.team_id) else {
            return;
        };
        let Some(idx) = entry.in_flight.iter().position(|(seq, _)| *seq == ticket.seq) else {
            return;
        };
        entry.in_flight.remove(idx);
        entry.confirmed += ticket.delta;
        if entry.newest_reply.map_or(true, |(seq, _)| ticket.seq > seq) {
            entry.newest_reply = Some((ticket.seq, server_score));
        }
        if entry.in_flight.is_empty() {
            if let Some((_, score)) = entry.newest_reply {
                entry.confirmed = score;
            }
        }
    }

    /// Drop a failed delta. Returns false if it was already settled.
    pub fn rollback(&mut self, ticket: PendingDelta) -> bool {
        let Some(entry) = self.teams.get_mut(&ticket.team_id) else {
            return false;
        };
        match entry.in_flight.iter().position(|(seq, _)| *seq == ticket.seq) {
            Some(idx) => {
                entry.in_flight.remove(idx);
                if entry.in_flight.is_empty() {
                    if let Some((_, score)) = entry.newest_reply {
                        entry.confirmed = score;
                    }
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn rapid_increments_all_show() {
        let team = Uuid::new_v4();
        let mut ledger = ScoreLedger::new();
        for _ in 0..3 {
            ledger.begin(team, 10, 1);
        }
        assert_eq!(ledger.displayed(team), Some(13));
        assert_eq!(ledger.in_flight(team), 3);
    }

    #[test]
    fn rollback_only_removes_the_failed_delta() {
        let team = Uuid::new_v4();
        let mut ledger = ScoreLedger::new();
        let first = ledger.begin(team, 10, 1);
        let second = ledger.begin(team, 10, 1);
        let third = ledger.begin(team, 10, 1);

        ledger.confirm(first, 11);
        assert!(ledger.rollback(second));
        assert_eq!(ledger.displayed(team), Some(12));

        ledger.confirm(third, 12);
        assert_eq!(ledger.displayed(team), Some(12));
        assert_eq!(ledger.in_flight(team), 0);
        assert!(!ledger.rollback(second));
    }

    #[test]
    fn late_confirmation_does_not_reset_to_stale_snapshot() {
        let team = Uuid::new_v4();
        let mut ledger = ScoreLedger::new();
        let first = ledger.begin(team, 0, 1);
        let second = ledger.begin(team, 0, 1);

        // Second reply arrives first and already includes the first delta.
        ledger.confirm(second, 2);
        assert_eq!(ledger.displayed(team), Some(2));
        ledger.confirm(first, 1);
        assert_eq!(ledger.displayed(team), Some(2));
    }
}
