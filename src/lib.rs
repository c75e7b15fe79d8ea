//! Tournament bracket engine: generation, advancement, standings and phase transitions
//! for single elimination, round robin and Swiss events.

pub mod audit;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use audit::{Action, ActionReport};
pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, EngineResult, Rejection, StoreError, StoreResult};
pub use logic::{
    advance, generate, pair_swiss_round, plan_transition, Advancement, PendingDelta,
    PhasePlan, PhaseRequest, ScoreLedger, Selection, DEFAULT_MAX_PASSES,
};
pub use models::{
    EventId, Format, Match, MatchId, MatchKind, MatchLink, MatchPatch, MatchStatus, Slot,
    Standing, StandingsTable, Team, TeamId,
};
pub use service::{EventView, MatchResult, Outcome, StandingsView, TournamentService};
pub use store::{InMemoryStore, RetryPolicy, TournamentStore};
