//! Match, the per-format match kind, and partial updates.

use crate::models::team::{EventId, TeamId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Competitive format of a bracket or phase.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    SingleElim,
    RoundRobin,
    Swiss,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::SingleElim => write!(f, "single elimination"),
            Format::RoundRobin => write!(f, "round robin"),
            Format::Swiss => write!(f, "swiss"),
        }
    }
}

/// Which side of the next match a winner feeds into.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Even positions feed slot A, odd positions feed slot B.
    pub fn for_position(position: u32) -> Self {
        if position % 2 == 0 {
            Slot::A
        } else {
            Slot::B
        }
    }
}

/// Where a single-elimination winner goes next.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct MatchLink {
    pub match_id: MatchId,
    pub slot: Slot,
}

/// Progress of a match. Nothing in the engine moves a match out of `Completed`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Live,
    Completed,
}

/// Format-specific part of a match. Only single elimination carries a link.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bracket_type", rename_all = "snake_case")]
pub enum MatchKind {
    SingleElim {
        #[serde(default)]
        next_match_id: Option<MatchId>,
        #[serde(default)]
        next_match_slot: Option<Slot>,
    },
    RoundRobin,
    Swiss,
}

impl MatchKind {
    /// An unlinked kind for the given format.
    pub fn unlinked(format: Format) -> Self {
        match format {
            Format::SingleElim => MatchKind::SingleElim {
                next_match_id: None,
                next_match_slot: None,
            },
            Format::RoundRobin => MatchKind::RoundRobin,
            Format::Swiss => MatchKind::Swiss,
        }
    }

    pub fn format(&self) -> Format {
        match self {
            MatchKind::SingleElim { .. } => Format::SingleElim,
            MatchKind::RoundRobin => Format::RoundRobin,
            MatchKind::Swiss => Format::Swiss,
        }
    }
}

/// A single match between two (possibly undetermined) teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub event_id: EventId,
    #[serde(flatten)]
    pub kind: MatchKind,
    /// Single elimination (native): highest round is played first, round 0 is the final.
    /// Round robin and Swiss count up from 0.
    pub round: u32,
    /// Unique within `(round, group_id)`.
    pub position: u32,
    /// Phase label, e.g. "Groups" or "Playoffs".
    #[serde(default)]
    pub group_id: Option<String>,
    /// None means "to be determined" or a permanent bye slot.
    pub team_a_id: Option<TeamId>,
    pub team_b_id: Option<TeamId>,
    #[serde(default)]
    pub team_a_score: i64,
    #[serde(default)]
    pub team_b_score: i64,
    /// Must be `team_a_id` or `team_b_id` when set.
    #[serde(default)]
    pub winner_id: Option<TeamId>,
    #[serde(default)]
    pub status: MatchStatus,
}

impl Match {
    /// Create a pending, unlinked match.
    pub fn new(
        event_id: EventId,
        format: Format,
        round: u32,
        position: u32,
        team_a_id: Option<TeamId>,
        team_b_id: Option<TeamId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            kind: MatchKind::unlinked(format),
            round,
            position,
            group_id: None,
            team_a_id,
            team_b_id,
            team_a_score: 0,
            team_b_score: 0,
            winner_id: None,
            status: MatchStatus::Pending,
        }
    }

    pub fn format(&self) -> Format {
        self.kind.format()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// The link to the next match, if this is a linked single-elimination match.
    pub fn next(&self) -> Option<MatchLink> {
        match self.kind {
            MatchKind::SingleElim {
                next_match_id: Some(match_id),
                next_match_slot: Some(slot),
            } => Some(MatchLink { match_id, slot }),
            _ => None,
        }
    }

    pub fn team(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::A => self.team_a_id,
            Slot::B => self.team_b_id,
        }
    }

    pub fn has_team(&self, team: TeamId) -> bool {
        self.team_a_id == Some(team) || self.team_b_id == Some(team)
    }

    /// The losing side of a completed match with a winner.
    pub fn loser_id(&self) -> Option<TeamId> {
        let winner = self.winner_id?;
        if self.team_a_id == Some(winner) {
            self.team_b_id
        } else if self.team_b_id == Some(winner) {
            self.team_a_id
        } else {
            None
        }
    }

    /// Apply a partial update. Fields left `None` in the patch are unchanged.
    /// A link is ignored on formats that have no notion of one.
    pub fn apply(&mut self, patch: &MatchPatch) {
        if let Some(team) = patch.team_a_id {
            self.team_a_id = Some(team);
        }
        if let Some(team) = patch.team_b_id {
            self.team_b_id = Some(team);
        }
        if let Some(score) = patch.team_a_score {
            self.team_a_score = score;
        }
        if let Some(score) = patch.team_b_score {
            self.team_b_score = score;
        }
        if let Some(winner) = patch.winner_id {
            self.winner_id = Some(winner);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(link) = patch.next {
            if let MatchKind::SingleElim {
                next_match_id,
                next_match_slot,
            } = &mut self.kind
            {
                *next_match_id = Some(link.match_id);
                *next_match_slot = Some(link.slot);
            }
        }
    }
}

/// Set-only partial update of a match, as sent to `update_match`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_a_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_b_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_a_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_b_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<MatchLink>,
}

impl MatchPatch {
    pub fn is_empty(&self) -> bool {
        *self == MatchPatch::default()
    }

    /// Set the team in one slot.
    pub fn with_team(mut self, slot: Slot, team: TeamId) -> Self {
        match slot {
            Slot::A => self.team_a_id = Some(team),
            Slot::B => self.team_b_id = Some(team),
        }
        self
    }

    /// Fold a later patch into this one; later values win.
    pub fn merge(&mut self, later: &MatchPatch) {
        self.team_a_id = later.team_a_id.or(self.team_a_id);
        self.team_b_id = later.team_b_id.or(self.team_b_id);
        self.team_a_score = later.team_a_score.or(self.team_a_score);
        self.team_b_score = later.team_b_score.or(self.team_b_score);
        self.winner_id = later.winner_id.or(self.winner_id);
        self.status = later.status.or(self.status);
        self.next = later.next.or(self.next);
    }
}
