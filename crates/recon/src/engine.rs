use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use rayon::prelude::*;

use crate::aggregate::aggregate_goals;
use crate::classify::reconcile_match;
use crate::config::{EventColumns, InputFormat, MatchColumns, ReconConfig};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::model::{
    EnrichedMatch, EventRecord, EventType, MatchRecord, ReconInput, ReconMeta, ReconResult,
};
use crate::trace::TraceMode;

/// Knobs the batch driver honours. Neither affects the output values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconOptions {
    pub parallel: bool,
    pub trace: TraceMode,
}

/// Group events by `match_id`, keeping feed order within each group.
pub fn group_events_by_match(events: &[EventRecord]) -> HashMap<&str, Vec<&EventRecord>> {
    let mut groups: HashMap<&str, Vec<&EventRecord>> = HashMap::new();
    for event in events {
        groups.entry(event.match_id.as_str()).or_default().push(event);
    }
    groups
}

/// Reconcile every match against its events.
///
/// Returns exactly one enriched record per input match, in input order.
/// Matches without events reconcile against an empty tally.
pub fn reconcile_batch(
    matches: &[MatchRecord],
    events: &[EventRecord],
    options: &ReconOptions,
) -> Vec<EnrichedMatch> {
    // Built once up front; workers only read it.
    let groups = group_events_by_match(events);
    let trace = options.trace;

    let reconcile_one = |record: &MatchRecord| {
        let breakdown = groups
            .get(record.id.as_str())
            .map(|group| aggregate_goals(group.iter().copied()))
            .unwrap_or_default();
        reconcile_match(record, breakdown, trace)
    };

    if options.parallel {
        matches.par_iter().map(reconcile_one).collect()
    } else {
        matches.iter().map(reconcile_one).collect()
    }
}

/// Number of events that reference no input match.
pub fn count_orphan_events(matches: &[MatchRecord], events: &[EventRecord]) -> usize {
    let ids: HashSet<&str> = matches.iter().map(|m| m.id.as_str()).collect();
    events
        .iter()
        .filter(|e| !ids.contains(e.match_id.as_str()))
        .count()
}

/// Run reconciliation per config. Returns enriched matches + summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> ReconResult {
    run_with(&config.name, input, &config.options())
}

/// Run reconciliation with explicit options (CLI flags may override config).
pub fn run_with(name: &str, input: &ReconInput, options: &ReconOptions) -> ReconResult {
    let matches = reconcile_batch(&input.matches, &input.events, options);

    let orphan_events = count_orphan_events(&input.matches, &input.events);
    if orphan_events > 0 {
        log::warn!("{orphan_events} event(s) reference matches not present in the match list");
    }

    let summary = compute_summary(&matches, orphan_events);
    log::info!(
        "reconciled {} matches: {} mismatches, {} duplicate events",
        summary.total_matches,
        summary.mismatches,
        summary.duplicate_events,
    );

    ReconResult {
        meta: ReconMeta {
            config_name: name.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            parallel: options.parallel,
        },
        summary,
        matches,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read both inputs named in the config, resolving paths against `base_dir`.
pub fn load_input(config: &ReconConfig, base_dir: &Path) -> Result<ReconInput, ReconError> {
    let matches_cfg = &config.inputs.matches;
    let events_cfg = &config.inputs.events;

    let matches_data = read_file(&base_dir.join(&matches_cfg.file))?;
    let matches = match matches_cfg.resolved_format()? {
        InputFormat::Csv => load_csv_matches(&matches_data, &matches_cfg.columns)?,
        InputFormat::Json => load_json_matches(&matches_data)?,
    };

    let events_data = read_file(&base_dir.join(&events_cfg.file))?;
    let events = match events_cfg.resolved_format()? {
        InputFormat::Csv => load_csv_events(&events_data, &events_cfg.columns)?,
        InputFormat::Json => load_json_events(&events_data)?,
    };

    log::debug!("loaded {} matches and {} events", matches.len(), events.len());
    Ok(ReconInput { matches, events })
}

fn read_file(path: &Path) -> Result<String, ReconError> {
    std::fs::read_to_string(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))
}

pub fn load_json_matches(data: &str) -> Result<Vec<MatchRecord>, ReconError> {
    serde_json::from_str(data).map_err(|e| ReconError::Json {
        input: "matches".into(),
        message: e.to_string(),
    })
}

pub fn load_json_events(data: &str) -> Result<Vec<EventRecord>, ReconError> {
    serde_json::from_str(data).map_err(|e| ReconError::Json {
        input: "events".into(),
        message: e.to_string(),
    })
}

/// Header row of a CSV input with name → index lookup.
struct CsvHeaders {
    input: &'static str,
    names: Vec<String>,
}

impl CsvHeaders {
    fn read(input: &'static str, reader: &mut csv::Reader<&[u8]>) -> Result<Self, ReconError> {
        let names = reader
            .headers()
            .map_err(|e| csv_err(input, e))?
            .iter()
            .map(|h| h.to_string())
            .collect();
        Ok(Self { input, names })
    }

    fn optional(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|h| h == name)
    }

    fn required(&self, name: &str) -> Result<usize, ReconError> {
        self.optional(name).ok_or_else(|| ReconError::MissingColumn {
            input: self.input.into(),
            column: name.into(),
        })
    }
}

fn csv_reader(data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes())
}

fn csv_err(input: &str, e: csv::Error) -> ReconError {
    ReconError::Csv {
        input: input.into(),
        message: e.to_string(),
    }
}

/// Non-empty cell at `idx`, if the column exists.
fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Load match records. Unmapped columns are kept in `extra`.
pub fn load_csv_matches(
    csv_data: &str,
    columns: &MatchColumns,
) -> Result<Vec<MatchRecord>, ReconError> {
    let mut reader = csv_reader(csv_data);
    let headers = CsvHeaders::read("matches", &mut reader)?;

    let id_idx = headers.required(&columns.id)?;
    let home_idx = headers.required(&columns.home_score)?;
    let away_idx = headers.required(&columns.away_score)?;
    let status_idx = headers.optional(&columns.status);

    let mapped = [Some(id_idx), Some(home_idx), Some(away_idx), status_idx];

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_err("matches", e))?;

        let id = record.get(id_idx).unwrap_or("").to_string();
        let home_score = parse_score(&id, record.get(home_idx))?;
        let away_score = parse_score(&id, record.get(away_idx))?;
        let status = cell(&record, status_idx).unwrap_or_default();

        let mut extra = BTreeMap::new();
        for (i, h) in headers.names.iter().enumerate() {
            if mapped.contains(&Some(i)) {
                continue;
            }
            if let Some(val) = record.get(i) {
                extra.insert(h.clone(), serde_json::Value::String(val.to_string()));
            }
        }

        rows.push(MatchRecord {
            id,
            status,
            home_score,
            away_score,
            extra,
        });
    }

    Ok(rows)
}

fn parse_score(record_id: &str, value: Option<&str>) -> Result<Option<u32>, ReconError> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| ReconError::ScoreParse {
            record_id: record_id.into(),
            value: v.into(),
        }),
    }
}

/// Load event records. Optional columns may be absent from the header.
pub fn load_csv_events(
    csv_data: &str,
    columns: &EventColumns,
) -> Result<Vec<EventRecord>, ReconError> {
    let mut reader = csv_reader(csv_data);
    let headers = CsvHeaders::read("events", &mut reader)?;

    let match_id_idx = headers.required(&columns.match_id)?;
    let type_idx = headers.required(&columns.event_type)?;
    let team_idx = headers.optional(&columns.team);
    let side_idx = headers.optional(&columns.team_side);
    let minute_idx = headers.optional(&columns.minute);
    let player_idx = headers.optional(&columns.player_name);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_err("events", e))?;

        let match_id = record.get(match_id_idx).unwrap_or("").to_string();
        let event_type = record
            .get(type_idx)
            .unwrap_or("")
            .parse::<EventType>()
            .unwrap_or(EventType::Other);

        // A minute we cannot read (e.g. "45+2") only weakens the dedup key
        let minute = cell(&record, minute_idx).and_then(|v| match v.parse::<i32>() {
            Ok(m) => Some(m),
            Err(_) => {
                log::warn!("event for match '{match_id}': ignoring unreadable minute '{v}'");
                None
            }
        });

        rows.push(EventRecord {
            match_id,
            event_type,
            team: cell(&record, team_idx),
            team_side: cell(&record, side_idx),
            minute,
            player_name: cell(&record, player_idx),
        });
    }

    Ok(rows)
}
