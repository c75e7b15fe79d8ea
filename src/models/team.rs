//! Team data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

/// Unique identifier for a tournament event. Opaque to the engine.
pub type EventId = Uuid;

/// A team entered in an event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub event_id: EventId,
    pub name: String,
    /// Running total. Leaderboard value for points events and the last ranking tiebreak.
    #[serde(default)]
    pub score: i64,
}

impl Team {
    /// Create a new team with the given name and a zero score.
    pub fn new(event_id: EventId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            name: name.into(),
            score: 0,
        }
    }
}
