//! Shape of single-elimination trees: which round is the final and where winners go.
//!
//! A freshly generated bracket counts rounds down to the final at round 0. A bracket
//! created by a phase transition is renumbered so its rounds count up and the final is
//! the highest round. Both are handled per `group_id`.

use crate::models::{Format, Match, MatchId, MatchLink, Slot};
use std::collections::HashMap;

/// Orientation and extent of one single-elimination group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    pub first_round: u32,
    pub final_round: u32,
}

impl Layout {
    fn descending(&self) -> bool {
        self.first_round > self.final_round
    }

    /// The round a winner of `round` plays next, or None for the final.
    pub fn parent_round(&self, round: u32) -> Option<u32> {
        if round == self.final_round {
            None
        } else if self.descending() {
            round.checked_sub(1)
        } else {
            Some(round + 1)
        }
    }

    /// Rounds played before this one (0 for the first round).
    pub fn depth(&self, round: u32) -> u32 {
        self.first_round.abs_diff(round)
    }

    pub fn is_final(&self, round: u32) -> bool {
        round == self.final_round
    }
}

/// Index of single-elimination matches by group, round and position.
#[derive(Debug, Default)]
pub struct EliminationIndex {
    layouts: HashMap<Option<String>, Layout>,
    slots: HashMap<(Option<String>, u32, u32), MatchId>,
}

impl EliminationIndex {
    pub fn build<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Self {
        let mut rounds: HashMap<Option<String>, HashMap<u32, usize>> = HashMap::new();
        let mut slots = HashMap::new();
        for m in matches {
            if m.format() != Format::SingleElim {
                continue;
            }
            *rounds
                .entry(m.group_id.clone())
                .or_default()
                .entry(m.round)
                .or_default() += 1;
            slots.insert((m.group_id.clone(), m.round, m.position), m.id);
        }

        let layouts = rounds
            .into_iter()
            .filter_map(|(group, counts)| {
                let (&min, &at_min) = counts.iter().min_by_key(|(round, _)| **round)?;
                let (&max, &at_max) = counts.iter().max_by_key(|(round, _)| **round)?;
                // The final is the round with the fewest matches.
                let layout = if at_min < at_max {
                    Layout {
                        first_round: max,
                        final_round: min,
                    }
                } else {
                    Layout {
                        first_round: min,
                        final_round: max,
                    }
                };
                Some((group, layout))
            })
            .collect();

        Self { layouts, slots }
    }

    pub fn layout(&self, group: &Option<String>) -> Option<Layout> {
        self.layouts.get(group).copied()
    }

    /// The link a match should carry, or None if it is a final or its parent is missing.
    pub fn expected_link(&self, m: &Match) -> Option<MatchLink> {
        let parent_round = self.layout(&m.group_id)?.parent_round(m.round)?;
        let parent = self
            .slots
            .get(&(m.group_id.clone(), parent_round, m.position / 2))?;
        Some(MatchLink {
            match_id: *parent,
            slot: Slot::for_position(m.position),
        })
    }

    pub fn is_final(&self, m: &Match) -> bool {
        self.layout(&m.group_id)
            .is_some_and(|layout| layout.is_final(m.round))
    }

    /// Rounds played before this match within its group.
    pub fn depth(&self, m: &Match) -> u32 {
        self.layout(&m.group_id)
            .map_or(0, |layout| layout.depth(m.round))
    }
}
