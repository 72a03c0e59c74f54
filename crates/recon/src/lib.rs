//! `scoreline-recon` — provider scoreboard vs. match-event reconciliation.
//!
//! Pure engine crate: receives pre-loaded match and event records, returns
//! enriched matches carrying a display score, a mismatch flag and the
//! provenance of that score. The provider score is never overwritten.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod trace;

pub use aggregate::aggregate_goals;
pub use classify::reconcile_match;
pub use config::ReconConfig;
pub use engine::{reconcile_batch, run, run_with, ReconOptions};
pub use error::ReconError;
pub use model::{
    EnrichedMatch, EventRecord, EventType, GoalBreakdown, MatchRecord, ReconInput, ReconResult,
    ScoreSource, Side,
};
pub use trace::TraceMode;
