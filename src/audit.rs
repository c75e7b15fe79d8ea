//! Structured action reports for the external audit sink.

use crate::models::{EventId, Format};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the engine did.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Generate,
    Regenerate,
    AdvanceRound,
    ResolveBye,
    RecordResult,
    AdjustScore,
}

/// One auditable action: a readable message plus the metadata behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub action: Action,
    pub event_id: EventId,
    pub message: String,
    pub format: Option<Format>,
    pub team_count: Option<usize>,
    pub round: Option<u32>,
    pub matches_created: usize,
    pub matches_updated: usize,
    pub byes_resolved: usize,
    pub at: DateTime<Utc>,
}

impl ActionReport {
    pub fn new(action: Action, event_id: EventId, message: impl Into<String>) -> Self {
        Self {
            action,
            event_id,
            message: message.into(),
            format: None,
            team_count: None,
            round: None,
            matches_created: 0,
            matches_updated: 0,
            byes_resolved: 0,
            at: Utc::now(),
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_team_count(mut self, count: usize) -> Self {
        self.team_count = Some(count);
        self
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }

    /// Log the report at info level and hand it back.
    pub fn logged(self) -> Self {
        log::info!("[{}] {:?}: {}", self.event_id, self.action, self.message);
        self
    }
}
