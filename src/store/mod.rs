//! Persistence boundary.
//!
//! The engine never owns storage. The surrounding application implements
//! [`TournamentStore`]; [`InMemoryStore`] backs the web host and the tests.

mod memory;
pub mod retry;

use crate::error::StoreResult;
use crate::models::{EventId, Match, MatchId, MatchPatch, Team, TeamId};
use async_trait::async_trait;

pub use memory::InMemoryStore;
pub use retry::RetryPolicy;

/// Operations the engine needs from persistence. Any call may fail and is retried by
/// the caller according to [`RetryPolicy`].
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// All matches of an event.
    async fn list_matches(&self, event_id: EventId) -> StoreResult<Vec<Match>>;

    /// Event roster, in registration order.
    async fn list_teams(&self, event_id: EventId) -> StoreResult<Vec<Team>>;

    /// Insert freshly generated matches.
    async fn insert_matches(&self, matches: &[Match]) -> StoreResult<()>;

    /// Apply a partial update to one match.
    async fn update_match(&self, id: MatchId, patch: &MatchPatch) -> StoreResult<()>;

    /// Delete every match of an event.
    async fn delete_matches(&self, event_id: EventId) -> StoreResult<()>;

    /// Add `delta` to a team's running score and return the stored team.
    async fn add_team_score(&self, team_id: TeamId, delta: i64) -> StoreResult<Team>;
}
