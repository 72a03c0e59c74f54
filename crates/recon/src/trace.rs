//! Development-mode diagnostic trace for reconciliation decisions.
//!
//! Advisory only: nothing here feeds back into a decision, and the `log`
//! macros never fail, so a missing or misconfigured logger is harmless.

use crate::model::{GoalBreakdown, MatchRecord, ScoreSource};

/// Environment variable that switches dev-mode tracing on.
pub const DEV_MODE_ENV: &str = "SCORELINE_DEV";

/// Log target used for per-match trace lines.
pub const TRACE_TARGET: &str = "scoreline::recon";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceMode {
    #[default]
    Off,
    Dev,
}

impl TraceMode {
    pub fn from_flag(dev_mode: bool) -> Self {
        if dev_mode {
            Self::Dev
        } else {
            Self::Off
        }
    }

    /// `Dev` when `SCORELINE_DEV` is set to `1`, `true` or `yes`.
    pub fn from_env() -> Self {
        match std::env::var(DEV_MODE_ENV) {
            Ok(v) => Self::from_flag(matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
            Err(_) => Self::Off,
        }
    }

    /// Either source can switch tracing on.
    pub fn or(self, other: TraceMode) -> TraceMode {
        if self == Self::Dev || other == Self::Dev {
            Self::Dev
        } else {
            Self::Off
        }
    }

    pub fn is_dev(&self) -> bool {
        *self == Self::Dev
    }
}

/// Emit one line describing the inputs and the chosen source.
pub fn trace_decision(
    mode: TraceMode,
    record: &MatchRecord,
    breakdown: &GoalBreakdown,
    source: ScoreSource,
) {
    if !mode.is_dev() || !log::log_enabled!(target: TRACE_TARGET, log::Level::Debug) {
        return;
    }
    log::debug!(
        target: TRACE_TARGET,
        "match {} status={:?} provider={}-{} events={}-{} (total {}, dup {}) -> {}",
        record.id,
        record.status,
        fmt_score(record.home_score),
        fmt_score(record.away_score),
        breakdown.home,
        breakdown.away,
        breakdown.total,
        breakdown.duplicates,
        source,
    );
}

fn fmt_score(score: Option<u32>) -> String {
    score.map_or_else(|| "null".to_string(), |s| s.to_string())
}
