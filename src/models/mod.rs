//! Data structures for the bracket engine: teams, matches, standings.

mod game;
mod standing;
mod team;

pub use game::{Format, Match, MatchId, MatchKind, MatchLink, MatchPatch, MatchStatus, Slot};
pub use standing::{Standing, StandingsTable};
pub use team::{EventId, Team, TeamId};
