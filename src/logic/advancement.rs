//! Single-elimination advancement: link matches, move winners forward, resolve byes.
//!
//! Everything here is recomputed from the match list on every call, so running it
//! again (or from two clients at once) converges on the same state.

use crate::logic::layout::EliminationIndex;
use crate::models::{Format, Match, MatchId, MatchPatch, MatchStatus, Slot, TeamId};
use std::collections::{HashMap, HashSet};

/// Default bound on resolution passes. Each pass walks the tree from the first round to
/// the final, so one pass normally settles everything and the next confirms it.
pub const DEFAULT_MAX_PASSES: usize = 6;

/// Guard against corrupt links forming a cycle.
const MAX_FEED_DEPTH: usize = 64;

/// What an advancement run changed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Advancement {
    /// One merged patch per touched match, in first-touched order.
    pub updates: Vec<(MatchId, MatchPatch)>,
    pub links_set: usize,
    pub byes_resolved: Vec<MatchId>,
    pub winners_advanced: usize,
    pub passes: usize,
    /// False if the pass bound was hit while changes were still being made.
    pub converged: bool,
}

impl Advancement {
    pub fn is_noop(&self) -> bool {
        self.updates.is_empty()
    }

    fn record(&mut self, m: &mut Match, patch: MatchPatch) {
        m.apply(&patch);
        match self.updates.iter_mut().find(|(id, _)| *id == m.id) {
            Some((_, existing)) => existing.merge(&patch),
            None => self.updates.push((m.id, patch)),
        }
    }
}

/// Which matches feed each slot, from the current links.
struct Feeders {
    by_id: HashMap<MatchId, usize>,
    into: HashMap<(MatchId, Slot), Vec<usize>>,
}

impl Feeders {
    fn build(matches: &[Match]) -> Self {
        let by_id = matches.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        let mut into: HashMap<(MatchId, Slot), Vec<usize>> = HashMap::new();
        for (i, m) in matches.iter().enumerate() {
            if let Some(link) = m.next() {
                into.entry((link.match_id, link.slot)).or_default().push(i);
            }
        }
        Self { by_id, into }
    }

    /// True if some feeder of this slot may still produce a winner.
    fn is_fed(&self, matches: &[Match], id: MatchId, slot: Slot, depth: usize) -> bool {
        if depth > MAX_FEED_DEPTH {
            return false;
        }
        self.into
            .get(&(id, slot))
            .is_some_and(|feeders| feeders.iter().any(|&f| self.is_live(matches, f, depth + 1)))
    }

    /// Not completed, and holding a team or waiting on a feeder that can deliver one.
    fn is_live(&self, matches: &[Match], i: usize, depth: usize) -> bool {
        let m = &matches[i];
        !m.is_completed()
            && (m.team_a_id.is_some()
                || m.team_b_id.is_some()
                || self.is_fed(matches, m.id, Slot::A, depth)
                || self.is_fed(matches, m.id, Slot::B, depth))
    }

    /// True if a feeder finished with a winner, whether or not it was pushed yet.
    fn has_result_waiting(&self, matches: &[Match], id: MatchId) -> bool {
        [Slot::A, Slot::B].iter().any(|&slot| {
            self.into.get(&(id, slot)).is_some_and(|feeders| {
                feeders
                    .iter()
                    .any(|&f| matches[f].is_completed() && matches[f].winner_id.is_some())
            })
        })
    }

    /// The team that wins this match by default: exactly one team present and the
    /// empty slot cannot be filled any more.
    fn bye_winner(&self, matches: &[Match], i: usize) -> Option<TeamId> {
        let m = &matches[i];
        if m.is_completed() {
            return None;
        }
        let (present, missing) = match (m.team_a_id, m.team_b_id) {
            (Some(team), None) => (team, Slot::B),
            (None, Some(team)) => (team, Slot::A),
            _ => return None,
        };
        if self.is_fed(matches, m.id, missing, 0) {
            None
        } else {
            Some(present)
        }
    }
}

/// Link every single-elimination match to its parent, then repeatedly push winners
/// forward and auto-complete byes until a pass changes nothing or `max_passes` is hit.
///
/// Matches of other formats are left alone. A match whose parent is missing (for
/// example after a partial write) is skipped and picked up on a later run.
pub fn advance(matches: &mut [Match], max_passes: usize) -> Advancement {
    let mut result = Advancement::default();
    let index = EliminationIndex::build(matches.iter());

    for m in matches.iter_mut().filter(|m| m.format() == Format::SingleElim) {
        match index.expected_link(m) {
            Some(link) if m.next() != Some(link) => {
                result.record(
                    m,
                    MatchPatch {
                        next: Some(link),
                        ..MatchPatch::default()
                    },
                );
                result.links_set += 1;
            }
            Some(_) => {}
            None if !index.is_final(m) => {
                log::warn!("Match {} (round {}) has no parent yet, not linked", m.id, m.round);
            }
            None => {}
        }
    }

    let feeders = Feeders::build(matches);
    let mut order: Vec<usize> = (0..matches.len())
        .filter(|&i| matches[i].format() == Format::SingleElim)
        .collect();
    order.sort_by_key(|&i| (index.depth(&matches[i]), matches[i].position));

    for pass in 1..=max_passes {
        let mut changed = false;
        for &i in &order {
            if let Some(winner) = feeders.bye_winner(matches, i) {
                log::debug!("Bye: {} advances from match {}", winner, matches[i].id);
                let patch = MatchPatch {
                    winner_id: Some(winner),
                    status: Some(MatchStatus::Completed),
                    ..MatchPatch::default()
                };
                result.record(&mut matches[i], patch);
                result.byes_resolved.push(matches[i].id);
                changed = true;
            }
            if push_winner(matches, i, &feeders, &mut result) {
                changed = true;
            }
        }
        result.passes = pass;
        if !changed {
            result.converged = true;
            break;
        }
    }

    if !result.converged {
        log::warn!(
            "Advancement stopped after {} passes with changes still pending",
            result.passes
        );
    }
    result
}

/// Copy a completed match's winner into its linked slot. Returns true if anything changed.
fn push_winner(matches: &mut [Match], i: usize, feeders: &Feeders, result: &mut Advancement) -> bool {
    let m = &matches[i];
    let (Some(winner), Some(link), true) = (m.winner_id, m.next(), m.is_completed()) else {
        return false;
    };
    let Some(&target) = feeders.by_id.get(&link.match_id) else {
        log::warn!("Match {} links to missing match {}, skipped", m.id, link.match_id);
        return false;
    };
    let next = &mut matches[target];
    if next.is_completed() || next.team(link.slot) == Some(winner) {
        return false;
    }
    result.record(next, MatchPatch::default().with_team(link.slot, winner));
    result.winners_advanced += 1;
    true
}

/// Pending single-elimination matches that can never get a team: both slots empty,
/// no finished feeder with a winner to push, and nothing upstream still able to fill them.
pub fn unplayable(matches: &[Match]) -> HashSet<MatchId> {
    let feeders = Feeders::build(matches);
    matches
        .iter()
        .enumerate()
        .filter(|(i, m)| m.format() == Format::SingleElim && !feeders.is_live(matches, *i, 0))
        .filter(|(_, m)| !m.is_completed() && !feeders.has_result_waiting(matches, m.id))
        .map(|(_, m)| m.id)
        .collect()
}
