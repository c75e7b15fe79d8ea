//! Phase transitions: build the next round or phase on top of existing results.

use crate::error::Rejection;
use crate::logic::layout::EliminationIndex;
use crate::logic::{advancement, generate, standings};
use crate::models::{EventId, Format, Match, Team, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which teams take part in the new phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Selection {
    All,
    Top(usize),
    Custom(Vec<TeamId>),
}

/// Request to create the next round or phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PhaseRequest {
    pub format: Format,
    pub selection: Selection,
    #[serde(default)]
    pub shuffle: bool,
    /// Stored as `group_id` on every new match.
    pub label: String,
}

/// Matches for a new phase, ready to insert.
#[derive(Clone, Debug)]
pub struct PhasePlan {
    pub matches: Vec<Match>,
    /// Teams in the order they were seeded.
    pub teams: Vec<TeamId>,
    /// Chronological round the new phase starts at.
    pub first_round: u32,
    pub format: Format,
    pub label: String,
}

/// Plan a transition from the current phase.
///
/// The current phase is the group of the match with the highest existing round. It is
/// refused while that phase is unfinished and when fewer than two teams are selected.
/// A label can only be reused to play the next round of the same Swiss group.
pub fn plan_transition<R: Rng + ?Sized>(
    event_id: EventId,
    request: &PhaseRequest,
    teams: &[Team],
    matches: &[Match],
    rng: &mut R,
) -> Result<PhasePlan, Rejection> {
    let latest = matches.iter().max_by_key(|m| m.round);
    let ranked: Vec<TeamId> = match latest {
        Some(latest) => {
            let group = &latest.group_id;
            let format = latest.format();
            let phase: Vec<Match> = matches
                .iter()
                .filter(|m| &m.group_id == group && m.format() == format)
                .cloned()
                .collect();
            check_phase_complete(&phase, format, latest.round)?;
            let table = standings::compute(format, &phase, teams);
            standings::rank(&table, teams)
                .into_iter()
                .map(|s| s.team_id)
                .collect()
        }
        None => teams.iter().map(|t| t.id).collect(),
    };

    let mut selected = match &request.selection {
        Selection::All => ranked,
        Selection::Top(n) => ranked.into_iter().take(*n).collect(),
        Selection::Custom(ids) => {
            let roster: HashSet<TeamId> = teams.iter().map(|t| t.id).collect();
            if let Some(unknown) = ids.iter().find(|id| !roster.contains(id)) {
                return Err(Rejection::UnknownTeam(*unknown));
            }
            let wanted: HashSet<TeamId> = ids.iter().copied().collect();
            ranked.into_iter().filter(|id| wanted.contains(id)).collect()
        }
    };
    if selected.len() < 2 {
        return Err(Rejection::NotEnoughTeams {
            selected: selected.len(),
        });
    }
    if request.shuffle {
        selected.shuffle(rng);
    }

    let next_round = matches.iter().map(|m| m.round + 1).max().unwrap_or(0);
    let label = Some(request.label.clone());
    let labelled: Vec<&Match> = matches.iter().filter(|m| m.group_id == label).collect();
    let continuing = request.format == Format::Swiss
        && labelled.iter().all(|m| m.format() == Format::Swiss);
    if !labelled.is_empty() && !continuing {
        return Err(Rejection::LabelInUse(request.label.clone()));
    }
    let continuing_swiss: Vec<Match> = labelled.into_iter().cloned().collect();

    let mut generated = if request.format == Format::Swiss && !continuing_swiss.is_empty() {
        generate::pair_swiss_round(event_id, &selected, &continuing_swiss, teams, next_round)
    } else {
        let mut fresh = generate::generate(request.format, event_id, &selected);
        renumber(&mut fresh, request.format, next_round);
        fresh
    };
    for m in &mut generated {
        m.group_id = label.clone();
    }

    Ok(PhasePlan {
        matches: generated,
        teams: selected,
        first_round: next_round,
        format: request.format,
        label: request.label.clone(),
    })
}

/// An elimination phase is finished once every match that can still be played is
/// completed, whatever its round numbering. Other formats check their latest round.
fn check_phase_complete(phase: &[Match], format: Format, latest_round: u32) -> Result<(), Rejection> {
    let pending: Vec<&Match> = match format {
        Format::SingleElim => {
            let unplayable = advancement::unplayable(phase);
            phase
                .iter()
                .filter(|m| !m.is_completed() && !unplayable.contains(&m.id))
                .collect()
        }
        Format::RoundRobin | Format::Swiss => phase
            .iter()
            .filter(|m| m.round == latest_round && !m.is_completed())
            .collect(),
    };
    let index = EliminationIndex::build(phase);
    match pending.iter().min_by_key(|m| index.depth(m)) {
        Some(earliest) => Err(Rejection::RoundIncomplete {
            round: earliest.round,
            pending: pending.len(),
        }),
        None => Ok(()),
    }
}

/// Group and format of the match at the highest round, if there are any matches.
pub fn current_phase(matches: &[Match]) -> Option<(Option<String>, Format)> {
    matches
        .iter()
        .max_by_key(|m| m.round)
        .map(|m| (m.group_id.clone(), m.format()))
}

/// Shift generated rounds so they follow `next_round`. Single elimination is flipped so
/// its first round comes first and its final last.
pub fn renumber(matches: &mut [Match], format: Format, next_round: u32) {
    match format {
        Format::SingleElim => {
            let max = matches.iter().map(|m| m.round).max().unwrap_or(0);
            for m in matches {
                m.round = next_round + (max - m.round);
            }
        }
        Format::RoundRobin | Format::Swiss => {
            for m in matches {
                m.round += next_round;
            }
        }
    }
}
