//! Integration tests for standings and ranking.

use bracket_engine::logic::standings;
use bracket_engine::{advance, generate, Format, Match, MatchStatus, Team, DEFAULT_MAX_PASSES};
use uuid::Uuid;

fn roster(n: usize) -> (Uuid, Vec<Team>) {
    let event = Uuid::new_v4();
    let teams = (0..n).map(|i| Team::new(event, format!("T{i}"))).collect();
    (event, teams)
}

fn report(m: &mut Match, a: i64, b: i64, status: MatchStatus) {
    m.team_a_score = a;
    m.team_b_score = b;
    m.status = status;
    if status == MatchStatus::Completed {
        m.winner_id = match a.cmp(&b) {
            std::cmp::Ordering::Greater => m.team_a_id,
            std::cmp::Ordering::Less => m.team_b_id,
            std::cmp::Ordering::Equal => None,
        };
    }
}

#[test]
fn round_robin_points_and_balance() {
    let (event, teams) = roster(4);
    let ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    let mut matches = generate(Format::RoundRobin, event, &ids);
    let results = [(3, 1), (2, 2), (0, 1), (5, 0), (1, 1), (4, 2)];
    for (m, (a, b)) in matches.iter_mut().zip(results) {
        report(m, a, b, MatchStatus::Completed);
    }

    let table = standings::round_robin(&matches, &teams);
    let wins: u32 = table.values().map(|s| s.wins).sum();
    let losses: u32 = table.values().map(|s| s.losses).sum();
    assert_eq!(wins, losses);
    assert_eq!(wins, 4);
    for s in table.values() {
        assert_eq!(s.points, 3 * s.wins + s.draws);
    }
    // T0: beat T1, drew T2, lost to T3.
    let t0 = &table[&ids[0]];
    assert_eq!((t0.wins, t0.draws, t0.losses, t0.points), (1, 1, 1, 4));
    assert_eq!((t0.score_for, t0.score_against), (5, 4));
}

#[test]
fn round_robin_scores_count_before_completion() {
    let (event, teams) = roster(2);
    let ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    let mut matches = generate(Format::RoundRobin, event, &ids);
    report(&mut matches[0], 7, 3, MatchStatus::Live);

    let table = standings::round_robin(&matches, &teams);
    let a = &table[&ids[0]];
    assert_eq!((a.score_for, a.score_against, a.score_diff), (7, 3, 4));
    assert_eq!((a.wins, a.points), (0, 0));
}

#[test]
fn completed_draw_needs_equal_scores() {
    let (event, teams) = roster(2);
    let ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    let mut matches = generate(Format::RoundRobin, event, &ids);
    matches[0].team_a_score = 2;
    matches[0].team_b_score = 1;
    matches[0].status = MatchStatus::Completed;

    let table = standings::round_robin(&matches, &teams);
    assert!(table.values().all(|s| s.draws == 0 && s.wins == 0));
}

#[test]
fn single_elim_eliminates_losers_and_places_finalists() {
    let (event, teams) = roster(4);
    let ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    let mut matches = generate(Format::SingleElim, event, &ids);
    advance(&mut matches, DEFAULT_MAX_PASSES);

    for (position, winner) in [(0, ids[0]), (1, ids[3])] {
        let m = matches
            .iter_mut()
            .find(|m| m.round == 1 && m.position == position)
            .unwrap();
        m.winner_id = Some(winner);
        m.status = MatchStatus::Completed;
    }
    advance(&mut matches, DEFAULT_MAX_PASSES);

    let table = standings::single_elim(&matches, &teams);
    assert!(table[&ids[1]].is_eliminated && table[&ids[2]].is_eliminated);
    assert!(table.values().all(|s| s.placement.is_none()));

    let last = matches.iter_mut().find(|m| m.round == 0).unwrap();
    last.winner_id = Some(ids[3]);
    last.status = MatchStatus::Completed;

    let table = standings::single_elim(&matches, &teams);
    assert_eq!(table[&ids[3]].placement, Some(1));
    assert_eq!(table[&ids[0]].placement, Some(2));
    assert_eq!(table[&ids[3]].wins, 2);
    assert!(table[&ids[0]].is_eliminated);
    assert!(!table[&ids[3]].is_eliminated);
}

#[test]
fn swiss_tracks_score_diff_on_unfinished_matches() {
    let (event, teams) = roster(4);
    let ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    let mut matches = generate(Format::Swiss, event, &ids);
    report(&mut matches[0], 3, 0, MatchStatus::Completed);
    report(&mut matches[1], 2, 1, MatchStatus::Live);

    let table = standings::swiss(&matches, &teams);
    let winner = matches[0].team_a_id.unwrap();
    assert_eq!(table[&winner].points, 3);
    assert_eq!(table[&winner].score_diff, 3);
    let leading = matches[1].team_a_id.unwrap();
    assert_eq!(table[&leading].points, 0);
    assert_eq!(table[&leading].score_diff, 1);
}

#[test]
fn compute_only_reads_matching_format() {
    let (event, teams) = roster(2);
    let ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    let mut matches = generate(Format::RoundRobin, event, &ids);
    matches.extend(generate(Format::Swiss, event, &ids));
    for m in matches.iter_mut() {
        report(m, 1, 0, MatchStatus::Completed);
    }
    let table = standings::compute(Format::RoundRobin, &matches, &teams);
    assert_eq!(table.values().map(|s| s.wins).sum::<u32>(), 1);
}

#[test]
fn ranking_breaks_ties_in_order() {
    let (event, mut teams) = roster(4);
    teams[3].score = 10;
    let ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    let mut matches = vec![
        Match::new(event, Format::RoundRobin, 0, 0, Some(ids[0]), Some(ids[1])),
        Match::new(event, Format::RoundRobin, 0, 1, Some(ids[2]), Some(ids[3])),
    ];
    report(&mut matches[0], 1, 0, MatchStatus::Completed);
    report(&mut matches[1], 0, 0, MatchStatus::Completed);

    let table = standings::round_robin(&matches, &teams);
    let ranked = standings::rank(&table, &teams);
    let order: Vec<_> = ranked.iter().map(|s| s.team_id).collect();
    // T0 on points; T3 and T2 drew, T3 has the higher running score; T1 last.
    assert_eq!(order, vec![ids[0], ids[3], ids[2], ids[1]]);
    let ranks: Vec<_> = ranked.iter().map(|s| s.rank).collect();
    assert_eq!(ranks, vec![Some(1), Some(2), Some(3), Some(4)]);
}

#[test]
fn ranking_is_stable_for_full_ties() {
    let (_, teams) = roster(5);
    let table = standings::round_robin(&[], &teams);
    let ranked = standings::rank(&table, &teams);
    let order: Vec<_> = ranked.iter().map(|s| s.team_id).collect();
    let roster_order: Vec<_> = teams.iter().map(|t| t.id).collect();
    assert_eq!(order, roster_order);
}

#[test]
fn unknown_teams_in_matches_are_ignored() {
    let (event, teams) = roster(1);
    let stranger = Uuid::new_v4();
    let mut matches = vec![Match::new(
        event,
        Format::RoundRobin,
        0,
        0,
        Some(teams[0].id),
        Some(stranger),
    )];
    report(&mut matches[0], 2, 0, MatchStatus::Completed);
    let table = standings::round_robin(&matches, &teams);
    assert_eq!(table.len(), 1);
    assert_eq!(table[&teams[0].id].wins, 1);
}
