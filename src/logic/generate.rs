//! Bracket generation: turn a team list into unlinked match records.
//!
//! Generation never fails. Fewer than two teams produce no matches.

use crate::logic::standings;
use crate::models::{EventId, Format, Match, Team, TeamId};
use std::collections::HashSet;

/// Generate the opening matches for `format`, in seed order.
///
/// Single elimination emits the whole tree; round robin every pairing; Swiss only its
/// first round (later rounds come from [`pair_swiss_round`]).
pub fn generate(format: Format, event_id: EventId, teams: &[TeamId]) -> Vec<Match> {
    if teams.len() < 2 {
        return Vec::new();
    }
    match format {
        Format::SingleElim => single_elimination(event_id, teams),
        Format::RoundRobin => round_robin(event_id, teams),
        Format::Swiss => swiss_first_round(event_id, teams),
    }
}

/// Pad to a power of two and lay out every round, first round at the highest number.
/// Only the first round gets teams: seeds `2p` and `2p + 1` meet at position `p`.
fn single_elimination(event_id: EventId, teams: &[TeamId]) -> Vec<Match> {
    let size = teams.len().next_power_of_two();
    let mut seeds: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    seeds.resize(size, None);

    let num_rounds = size.trailing_zeros();
    let mut matches = Vec::with_capacity(size - 1);
    for round in (0..num_rounds).rev() {
        let matches_in_round = 1u32 << round;
        for position in 0..matches_in_round {
            let (a, b) = if round == num_rounds - 1 {
                let p = position as usize * 2;
                (seeds[p], seeds[p + 1])
            } else {
                (None, None)
            };
            matches.push(Match::new(event_id, Format::SingleElim, round, position, a, b));
        }
    }
    matches
}

/// Every unordered pair once, in input order, all in round 0.
fn round_robin(event_id: EventId, teams: &[TeamId]) -> Vec<Match> {
    let mut matches = Vec::with_capacity(teams.len() * (teams.len() - 1) / 2);
    for (i, &a) in teams.iter().enumerate() {
        for &b in &teams[i + 1..] {
            let position = matches.len() as u32;
            matches.push(Match::new(event_id, Format::RoundRobin, 0, position, Some(a), Some(b)));
        }
    }
    matches
}

/// Sort by raw id, split in half and pair the top of the first half with the bottom
/// of the second. With an odd count the middle team sits out.
///
/// Seeding ignores team strength; the id order is kept so every client derives the
/// same pairings.
fn swiss_first_round(event_id: EventId, teams: &[TeamId]) -> Vec<Match> {
    let mut sorted = teams.to_vec();
    sorted.sort();
    let (first, second) = sorted.split_at(sorted.len() / 2);

    let matches: Vec<Match> = first
        .iter()
        .zip(second.iter().rev())
        .enumerate()
        .map(|(position, (&a, &b))| {
            Match::new(event_id, Format::Swiss, 0, position as u32, Some(a), Some(b))
        })
        .collect();
    if sorted.len() % 2 == 1 {
        log::debug!("Swiss round 0: {} sits out", second[0]);
    }
    matches
}

/// Pair a later Swiss round from the current record.
///
/// Teams are taken in ranking order; each is paired with the best-ranked free team it
/// has not met yet, falling back to a rematch when nobody new is left. Teams outside
/// `team_ids` are ignored. An odd team out gets no match this round.
pub fn pair_swiss_round(
    event_id: EventId,
    team_ids: &[TeamId],
    played: &[Match],
    teams: &[Team],
    round: u32,
) -> Vec<Match> {
    let selected: HashSet<TeamId> = team_ids.iter().copied().collect();
    let table = standings::swiss(played, teams);
    let mut order: Vec<TeamId> = standings::rank(&table, teams)
        .into_iter()
        .map(|s| s.team_id)
        .filter(|id| selected.contains(id))
        .collect();
    // Selected teams missing from the roster still play, after everyone ranked.
    for id in team_ids {
        if !order.contains(id) {
            order.push(*id);
        }
    }

    let met: HashSet<(TeamId, TeamId)> = played
        .iter()
        .filter_map(|m| Some(ordered_pair(m.team_a_id?, m.team_b_id?)))
        .collect();

    let mut matches = Vec::new();
    let mut free = order;
    while free.len() >= 2 {
        let a = free.remove(0);
        let pick = free
            .iter()
            .position(|&b| !met.contains(&ordered_pair(a, b)))
            .unwrap_or(0);
        let b = free.remove(pick);
        let position = matches.len() as u32;
        matches.push(Match::new(event_id, Format::Swiss, round, position, Some(a), Some(b)));
    }
    if let Some(left) = free.first() {
        log::debug!("Swiss round {}: {} sits out", round, left);
    }
    matches
}

fn ordered_pair(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
