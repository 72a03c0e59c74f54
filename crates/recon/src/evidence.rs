use std::collections::BTreeMap;

use crate::model::{EnrichedMatch, ReconSummary, ScoreSource};

const ALL_SOURCES: [ScoreSource; 5] = [
    ScoreSource::DbMismatchEvents,
    ScoreSource::DbAligned,
    ScoreSource::DbNoEvents,
    ScoreSource::EventsFallback,
    ScoreSource::DbMissingNoEvents,
];

/// Compute summary statistics from enriched matches.
///
/// Every source label appears in `source_counts`, zero or not.
pub fn compute_summary(results: &[EnrichedMatch], orphan_events: usize) -> ReconSummary {
    let mut source_counts: BTreeMap<String, usize> = ALL_SOURCES
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    let mut mismatches = 0;
    let mut duplicate_events: u64 = 0;

    for r in results {
        *source_counts.entry(r.score_source.to_string()).or_insert(0) += 1;
        if r.score_mismatch {
            mismatches += 1;
        }
        duplicate_events += u64::from(r.event_goal_breakdown.duplicates);
    }

    ReconSummary {
        total_matches: results.len(),
        mismatches,
        duplicate_events,
        orphan_events,
        source_counts,
    }
}
