//! Bracket engine logic: generation, advancement, standings and phase transitions.

pub mod advancement;
pub mod generate;
pub mod layout;
pub mod phase;
pub mod score_ledger;
pub mod standings;

pub use advancement::{advance, Advancement, DEFAULT_MAX_PASSES};
pub use generate::{generate, pair_swiss_round};
pub use phase::{plan_transition, PhasePlan, PhaseRequest, Selection};
pub use score_ledger::{PendingDelta, ScoreLedger};
