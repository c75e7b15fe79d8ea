//! Error types: validation rejections, store failures, and engine errors.

use crate::models::{MatchId, TeamId};
use std::time::Duration;
use thiserror::Error;

/// A caller error. Reported before anything is written.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Rejection {
    /// Fewer than two teams selected for generation or a transition.
    #[error("At least 2 teams are needed (selected {selected})")]
    NotEnoughTeams { selected: usize },

    /// The latest round still has matches that are not completed.
    #[error("Round {round} is not finished ({pending} match(es) not completed)")]
    RoundIncomplete { round: u32, pending: usize },

    /// A team id that is not in the event roster.
    #[error("Team {0} is not part of this event")]
    UnknownTeam(TeamId),

    /// A reported winner that is not one of the match's two teams.
    #[error("Team {winner} is not playing in match {match_id}")]
    InvalidWinner { match_id: MatchId, winner: TeamId },

    /// A match id that does not exist in the event.
    #[error("Match {0} not found")]
    UnknownMatch(MatchId),

    /// A completed elimination match must name who advances.
    #[error("Match {0} cannot be completed without a winner")]
    MissingWinner(MatchId),

    /// Completed matches keep their status and winner; only scores may be corrected.
    #[error("Match {0} is already completed")]
    MatchCompleted(MatchId),

    /// A phase label already used by another phase.
    #[error("Phase label {0:?} is already in use")]
    LabelInUse(String),
}

impl Rejection {
    /// Stable reason code for API clients and audit metadata.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NotEnoughTeams { .. } => "not_enough_teams",
            Rejection::RoundIncomplete { .. } => "round_incomplete",
            Rejection::UnknownTeam(_) => "unknown_team",
            Rejection::InvalidWinner { .. } => "invalid_winner",
            Rejection::UnknownMatch(_) => "unknown_match",
            Rejection::MissingWinner(_) => "missing_winner",
            Rejection::MatchCompleted(_) => "match_completed",
            Rejection::LabelInUse(_) => "label_in_use",
        }
    }
}

/// Failure reported by the persistence layer.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Timeouts and transport failures are worth retrying; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_) | StoreError::Connection(_) | StoreError::Network(_)
        )
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by the async service layer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A non-retryable store failure.
    #[error("{operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A retryable failure that did not clear within the attempt cap.
    #[error("{operation} failed after {attempts} attempts: {source}")]
    Exhausted {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    /// The rejection, if this was a validation failure.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            EngineError::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Result type for service operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Invalid configuration value.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected} (got {value:?})")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{name} must be at least {min}")]
    TooSmall { name: &'static str, min: u64 },
}
