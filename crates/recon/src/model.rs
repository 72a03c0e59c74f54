use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Kind of an in-match event as reported by the event feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    PenaltyGoal,
    OwnGoal,
    YellowCard,
    RedCard,
    Substitution,
    /// Anything the feed sends that we do not model.
    #[serde(other)]
    #[default]
    Other,
}

impl EventType {
    /// Goal, penalty goal and own goal move the scoreboard. Nothing else does.
    pub fn is_scoring(&self) -> bool {
        matches!(self, Self::Goal | Self::PenaltyGoal | Self::OwnGoal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::PenaltyGoal => "penalty_goal",
            Self::OwnGoal => "own_goal",
            Self::YellowCard => "yellow_card",
            Self::RedCard => "red_card",
            Self::Substitution => "substitution",
            Self::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = std::convert::Infallible;

    /// Unknown labels map to `Other`; parsing never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "goal" => Self::Goal,
            "penalty_goal" => Self::PenaltyGoal,
            "own_goal" => Self::OwnGoal,
            "yellow_card" => Self::YellowCard,
            "red_card" => Self::RedCard,
            "substitution" => Self::Substitution,
            _ => Self::Other,
        })
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Null, missing or non-string labels read as `Other`.
fn lenient_event_type<'de, D: Deserializer<'de>>(d: D) -> Result<EventType, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value
        .as_str()
        .and_then(|s| s.parse::<EventType>().ok())
        .unwrap_or(EventType::Other))
}

/// Ids are opaque: feeds send them as strings or as bare numbers.
fn opaque_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or numeric id, found {other}"
        ))),
    }
}

/// Minutes arrive as numbers or numeric strings. Anything else (e.g. "45+2")
/// reads as unknown.
fn lenient_minute<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => n.as_i64().and_then(|m| i32::try_from(m).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A single in-match event from the event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub match_id: String,
    #[serde(default, deserialize_with = "lenient_event_type")]
    pub event_type: EventType,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub team_side: Option<String>,
    #[serde(default, deserialize_with = "lenient_minute")]
    pub minute: Option<i32>,
    #[serde(default)]
    pub player_name: Option<String>,
}

/// A match as delivered by the scoreboard provider.
///
/// `extra` carries any provider fields we do not interpret so they survive
/// into the enriched output untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Keys the enriched output writes next to the flattened match record.
pub const ENRICHED_FIELDS: [&str; 7] = [
    "display_home_score",
    "display_away_score",
    "score_mismatch",
    "score_source",
    "event_goal_breakdown",
    "event_score_home",
    "event_score_away",
];

impl MatchRecord {
    /// Copy of the record with pass-through fields that would shadow an
    /// enriched output key removed (e.g. a previous run's output fed back in).
    pub fn without_enriched_fields(&self) -> MatchRecord {
        let mut record = self.clone();
        record
            .extra
            .retain(|key, _| !ENRICHED_FIELDS.contains(&key.as_str()));
        record
    }

    /// Provider scoreboard, only when both sides are present.
    pub fn provider_score(&self) -> Option<(u32, u32)> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// Pre-loaded matches and events for one reconciliation window.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub matches: Vec<MatchRecord>,
    pub events: Vec<EventRecord>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Which side of the pitch an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
    /// Neither `home` nor `away`. Holds the raw label so distinct unknown
    /// labels still dedup separately.
    Indeterminate(String),
}

impl Side {
    /// Side credited by an own goal scored by this side.
    pub fn opponent(&self) -> Side {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
            Self::Indeterminate(raw) => Self::Indeterminate(raw.clone()),
        }
    }
}

/// Deduplicated goal tally derived from one match's events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalBreakdown {
    pub home: u32,
    pub away: u32,
    pub total: u32,
    pub duplicates: u32,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Where the displayed score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    DbMismatchEvents,
    DbAligned,
    DbNoEvents,
    EventsFallback,
    DbMissingNoEvents,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DbMismatchEvents => "db_mismatch_events",
            Self::DbAligned => "db_aligned",
            Self::DbNoEvents => "db_no_events",
            Self::EventsFallback => "events_fallback",
            Self::DbMissingNoEvents => "db_missing_no_events",
        }
    }
}

impl std::fmt::Display for ScoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider match record plus everything the presentation layer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedMatch {
    #[serde(flatten)]
    pub record: MatchRecord,
    pub display_home_score: Option<u32>,
    pub display_away_score: Option<u32>,
    pub score_mismatch: bool,
    pub score_source: ScoreSource,
    pub event_goal_breakdown: GoalBreakdown,
    pub event_score_home: u32,
    pub event_score_away: u32,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub total_matches: usize,
    pub mismatches: usize,
    pub duplicate_events: u64,
    /// Events whose `match_id` matches no input match.
    pub orphan_events: usize,
    pub source_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matches: Vec<EnrichedMatch>,
}
