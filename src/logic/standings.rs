//! Standings: fold a match list into per-team records, one algorithm per format.

use crate::logic::layout::EliminationIndex;
use crate::models::{Format, Match, MatchStatus, Standing, StandingsTable, Team, TeamId};
use std::cmp::Reverse;

fn empty_table(teams: &[Team]) -> StandingsTable {
    teams.iter().map(|t| (t.id, Standing::new(t.id))).collect()
}

/// Standings for `format`, using only the matches of that format.
pub fn compute(format: Format, matches: &[Match], teams: &[Team]) -> StandingsTable {
    let relevant = matches.iter().filter(|m| m.format() == format);
    match format {
        Format::SingleElim => single_elim(relevant, teams),
        Format::RoundRobin => round_robin(relevant, teams),
        Format::Swiss => swiss(relevant, teams),
    }
}

/// Wins and losses from completed matches. Losers are eliminated; the completed final
/// of each group places its winner 1st and its loser 2nd.
pub fn single_elim<'a>(matches: impl IntoIterator<Item = &'a Match>, teams: &[Team]) -> StandingsTable {
    let matches: Vec<&Match> = matches.into_iter().collect();
    let index = EliminationIndex::build(matches.iter().copied());
    let mut table = empty_table(teams);

    for m in matches.iter().filter(|m| m.is_completed()) {
        let Some(winner) = m.winner_id else { continue };
        if let Some(s) = table.get_mut(&winner) {
            s.wins += 1;
        }
        let loser = m.loser_id();
        if let Some(s) = loser.and_then(|l| table.get_mut(&l)) {
            s.losses += 1;
            s.is_eliminated = true;
        }
        if index.is_final(m) {
            if let Some(s) = table.get_mut(&winner) {
                s.placement = Some(1);
            }
            if let Some(s) = loser.and_then(|l| table.get_mut(&l)) {
                s.placement = Some(2);
            }
        }
    }
    table
}

/// Score totals come from every match, including unfinished ones, so reported scores
/// show up before a match is closed. Results (3 per win, 1 per draw) only count once
/// a match is completed.
pub fn round_robin<'a>(matches: impl IntoIterator<Item = &'a Match>, teams: &[Team]) -> StandingsTable {
    let mut table = empty_table(teams);
    for m in matches {
        add_scores(&mut table, m);
        if m.status != MatchStatus::Completed {
            continue;
        }
        let (Some(a), Some(b)) = (m.team_a_id, m.team_b_id) else {
            continue;
        };
        if m.winner_id == Some(a) {
            record_result(&mut table, a, b);
        } else if m.winner_id == Some(b) {
            record_result(&mut table, b, a);
        } else if m.team_a_score == m.team_b_score {
            for team in [a, b] {
                if let Some(s) = table.get_mut(&team) {
                    s.add_draw();
                }
            }
        }
    }
    table
}

/// Same points as round robin without draws; `score_diff` runs over every match.
pub fn swiss<'a>(matches: impl IntoIterator<Item = &'a Match>, teams: &[Team]) -> StandingsTable {
    let mut table = empty_table(teams);
    for m in matches {
        add_scores(&mut table, m);
        if !m.is_completed() {
            continue;
        }
        let (Some(winner), Some(loser)) = (m.winner_id, m.loser_id()) else {
            continue;
        };
        record_result(&mut table, winner, loser);
    }
    table
}

fn add_scores(table: &mut StandingsTable, m: &Match) {
    if let Some(s) = m.team_a_id.and_then(|id| table.get_mut(&id)) {
        s.add_scores(m.team_a_score, m.team_b_score);
    }
    if let Some(s) = m.team_b_id.and_then(|id| table.get_mut(&id)) {
        s.add_scores(m.team_b_score, m.team_a_score);
    }
}

fn record_result(table: &mut StandingsTable, winner: TeamId, loser: TeamId) {
    if let Some(s) = table.get_mut(&winner) {
        s.add_win();
    }
    if let Some(s) = table.get_mut(&loser) {
        s.add_loss();
    }
}

/// Global ranking: points, wins, score difference, then the team's running score, all
/// descending. Remaining ties keep roster order.
pub fn rank(table: &StandingsTable, teams: &[Team]) -> Vec<Standing> {
    let mut rows: Vec<(i64, Standing)> = teams
        .iter()
        .filter_map(|t| table.get(&t.id).map(|s| (t.score, s.clone())))
        .collect();
    rows.sort_by_key(|(score, s)| {
        (
            Reverse(s.points),
            Reverse(s.wins),
            Reverse(s.score_diff),
            Reverse(*score),
        )
    });
    rows.into_iter()
        .enumerate()
        .map(|(i, (_, mut s))| {
            s.rank = Some(i as u32 + 1);
            s
        })
        .collect()
}
