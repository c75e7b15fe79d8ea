//! Per-team standings record derived from match results.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standings for one team. Computed, never stored.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Win = 3, draw = 1.
    pub points: u32,
    pub score_for: i64,
    pub score_against: i64,
    pub score_diff: i64,
    /// Single elimination only.
    pub is_eliminated: bool,
    /// Single elimination only: 1 for the champion, 2 for the runner-up.
    pub placement: Option<u32>,
    /// Position in the global ranking, 1-based. Set by `standings::rank`.
    pub rank: Option<u32>,
}

impl Standing {
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Self::default()
        }
    }

    pub fn add_win(&mut self) {
        self.wins += 1;
        self.points += 3;
    }

    pub fn add_loss(&mut self) {
        self.losses += 1;
    }

    pub fn add_draw(&mut self) {
        self.draws += 1;
        self.points += 1;
    }

    pub fn add_scores(&mut self, scored: i64, conceded: i64) {
        self.score_for += scored;
        self.score_against += conceded;
        self.score_diff += scored - conceded;
    }
}

/// Standings keyed by team.
pub type StandingsTable = HashMap<TeamId, Standing>;
