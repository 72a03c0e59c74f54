use std::path::Path;

use serde::Deserialize;

use crate::engine::ReconOptions;
use crate::error::ReconError;
use crate::trace::TraceMode;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    /// Treat any provider/event disagreement as a failed run.
    #[serde(default)]
    pub fail_on_mismatch: bool,
    pub inputs: InputsConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    pub matches: MatchInput,
    pub events: EventInput,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Explicit format if given, otherwise inferred from the file extension.
    pub fn resolve(
        input: &str,
        file: &str,
        explicit: Option<InputFormat>,
    ) -> Result<InputFormat, ReconError> {
        if let Some(format) = explicit {
            return Ok(format);
        }
        let ext = Path::new(file)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(ReconError::UnknownFormat {
                input: input.into(),
                file: file.into(),
            }),
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchInput {
    pub file: String,
    #[serde(default)]
    pub format: Option<InputFormat>,
    #[serde(default)]
    pub columns: MatchColumns,
}

impl MatchInput {
    pub fn resolved_format(&self) -> Result<InputFormat, ReconError> {
        InputFormat::resolve("matches", &self.file, self.format)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub file: String,
    #[serde(default)]
    pub format: Option<InputFormat>,
    #[serde(default)]
    pub columns: EventColumns,
}

impl EventInput {
    pub fn resolved_format(&self) -> Result<InputFormat, ReconError> {
        InputFormat::resolve("events", &self.file, self.format)
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// CSV header names for match records. Defaults to the field names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchColumns {
    pub id: String,
    pub status: String,
    pub home_score: String,
    pub away_score: String,
}

impl Default for MatchColumns {
    fn default() -> Self {
        Self {
            id: "id".into(),
            status: "status".into(),
            home_score: "home_score".into(),
            away_score: "away_score".into(),
        }
    }
}

impl MatchColumns {
    fn names(&self) -> [(&'static str, &str); 4] {
        [
            ("id", self.id.as_str()),
            ("status", self.status.as_str()),
            ("home_score", self.home_score.as_str()),
            ("away_score", self.away_score.as_str()),
        ]
    }
}

/// CSV header names for event records. Defaults to the field names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventColumns {
    pub match_id: String,
    pub event_type: String,
    pub team: String,
    pub team_side: String,
    pub minute: String,
    pub player_name: String,
}

impl Default for EventColumns {
    fn default() -> Self {
        Self {
            match_id: "match_id".into(),
            event_type: "event_type".into(),
            team: "team".into(),
            team_side: "team_side".into(),
            minute: "minute".into(),
            player_name: "player_name".into(),
        }
    }
}

impl EventColumns {
    fn names(&self) -> [(&'static str, &str); 6] {
        [
            ("match_id", self.match_id.as_str()),
            ("event_type", self.event_type.as_str()),
            ("team", self.team.as_str()),
            ("team_side", self.team_side.as_str()),
            ("minute", self.minute.as_str()),
            ("player_name", self.player_name.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Diagnostics + Execution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit a per-match trace line describing each decision.
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionConfig {
    /// Reconcile matches on the rayon worker pool.
    #[serde(default)]
    pub parallel: bool,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if self.inputs.matches.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "inputs.matches.file must not be empty".into(),
            ));
        }
        if self.inputs.events.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "inputs.events.file must not be empty".into(),
            ));
        }

        let matches_format = self.inputs.matches.resolved_format()?;
        let events_format = self.inputs.events.resolved_format()?;

        // Column mappings only matter for CSV inputs
        if matches_format == InputFormat::Csv {
            for (field, column) in self.inputs.matches.columns.names() {
                if column.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "inputs.matches.columns.{field} must not be empty"
                    )));
                }
            }
        }
        if events_format == InputFormat::Csv {
            for (field, column) in self.inputs.events.columns.names() {
                if column.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "inputs.events.columns.{field} must not be empty"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Engine options derived from this config.
    pub fn options(&self) -> ReconOptions {
        ReconOptions {
            parallel: self.execution.parallel,
            trace: TraceMode::from_flag(self.diagnostics.dev_mode),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
