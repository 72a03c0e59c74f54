use crate::model::{EnrichedMatch, GoalBreakdown, MatchRecord, ScoreSource};
use crate::trace::{trace_decision, TraceMode};

/// Pick the score source for a match.
///
/// The provider is authoritative whenever both of its scores are present.
/// Events only supply a fallback display or flag a disagreement; a partial
/// provider scoreboard counts as no scoreboard at all.
pub fn classify_source(record: &MatchRecord, breakdown: &GoalBreakdown) -> ScoreSource {
    let has_events = breakdown.total > 0;
    match record.provider_score() {
        Some((home, away)) if has_events => {
            if breakdown.home != home || breakdown.away != away {
                ScoreSource::DbMismatchEvents
            } else {
                ScoreSource::DbAligned
            }
        }
        Some(_) => ScoreSource::DbNoEvents,
        None if has_events => ScoreSource::EventsFallback,
        None => ScoreSource::DbMissingNoEvents,
    }
}

/// Reconcile one match against its event aggregate.
pub fn reconcile_match(
    record: &MatchRecord,
    breakdown: GoalBreakdown,
    trace: TraceMode,
) -> EnrichedMatch {
    let source = classify_source(record, &breakdown);

    let (display_home_score, display_away_score) = match source {
        ScoreSource::EventsFallback => (Some(breakdown.home), Some(breakdown.away)),
        _ => (record.home_score, record.away_score),
    };

    trace_decision(trace, record, &breakdown, source);

    EnrichedMatch {
        record: record.without_enriched_fields(),
        display_home_score,
        display_away_score,
        score_mismatch: source == ScoreSource::DbMismatchEvents,
        score_source: source,
        event_goal_breakdown: breakdown,
        event_score_home: breakdown.home,
        event_score_away: breakdown.away,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(home: Option<u32>, away: Option<u32>) -> MatchRecord {
        MatchRecord {
            id: "m1".into(),
            status: "FT".into(),
            home_score: home,
            away_score: away,
            extra: Default::default(),
        }
    }

    fn tally(home: u32, away: u32) -> GoalBreakdown {
        GoalBreakdown {
            home,
            away,
            total: home + away,
            duplicates: 0,
        }
    }

    #[test]
    fn provider_and_events_agree() {
        let out = reconcile_match(&record(Some(2), Some(1)), tally(2, 1), TraceMode::Off);
        assert_eq!(out.score_source, ScoreSource::DbAligned);
        assert!(!out.score_mismatch);
        assert_eq!(out.display_home_score, Some(2));
        assert_eq!(out.display_away_score, Some(1));
        assert_eq!(out.event_score_home, 2);
        assert_eq!(out.event_score_away, 1);
    }

    #[test]
    fn provider_wins_on_disagreement() {
        let out = reconcile_match(&record(Some(1), Some(1)), tally(2, 1), TraceMode::Off);
        assert_eq!(out.score_source, ScoreSource::DbMismatchEvents);
        assert!(out.score_mismatch);
        assert_eq!(out.display_home_score, Some(1));
        assert_eq!(out.display_away_score, Some(1));
        assert_eq!(out.event_goal_breakdown, tally(2, 1));
    }

    #[test]
    fn away_only_disagreement_is_mismatch() {
        let out = reconcile_match(&record(Some(2), Some(2)), tally(2, 1), TraceMode::Off);
        assert_eq!(out.score_source, ScoreSource::DbMismatchEvents);
    }

    #[test]
    fn provider_without_events() {
        let out = reconcile_match(&record(Some(3), Some(0)), tally(0, 0), TraceMode::Off);
        assert_eq!(out.score_source, ScoreSource::DbNoEvents);
        assert!(!out.score_mismatch);
        assert_eq!(out.display_home_score, Some(3));
    }

    #[test]
    fn only_duplicates_counts_as_no_events() {
        let breakdown = GoalBreakdown {
            duplicates: 4,
            ..Default::default()
        };
        let out = reconcile_match(&record(Some(1), Some(0)), breakdown, TraceMode::Off);
        assert_eq!(out.score_source, ScoreSource::DbNoEvents);
    }

    #[test]
    fn events_fill_missing_provider() {
        let out = reconcile_match(&record(None, None), tally(2, 0), TraceMode::Off);
        assert_eq!(out.score_source, ScoreSource::EventsFallback);
        assert!(!out.score_mismatch);
        assert_eq!(out.display_home_score, Some(2));
        assert_eq!(out.display_away_score, Some(0));
    }

    #[test]
    fn nothing_at_all() {
        let out = reconcile_match(&record(None, None), tally(0, 0), TraceMode::Off);
        assert_eq!(out.score_source, ScoreSource::DbMissingNoEvents);
        assert!(!out.score_mismatch);
        assert_eq!(out.display_home_score, None);
        assert_eq!(out.display_away_score, None);
    }

    #[test]
    fn partial_provider_is_treated_as_missing() {
        let partial = record(Some(0), None);

        let with_events = reconcile_match(&partial, tally(1, 1), TraceMode::Off);
        assert_eq!(with_events.score_source, ScoreSource::EventsFallback);
        assert!(!with_events.score_mismatch);
        assert_eq!(with_events.display_home_score, Some(1));
        assert_eq!(with_events.display_away_score, Some(1));

        let without = reconcile_match(&partial, tally(0, 0), TraceMode::Off);
        assert_eq!(without.score_source, ScoreSource::DbMissingNoEvents);
        assert_eq!(without.display_home_score, Some(0));
        assert_eq!(without.display_away_score, None);
    }

    #[test]
    fn stale_output_fields_do_not_shadow_fresh_ones() {
        let mut rec = record(Some(1), Some(0));
        rec.extra.insert("venue".into(), serde_json::json!("Emirates"));
        rec.extra.insert("score_mismatch".into(), serde_json::json!(true));
        rec.extra.insert("score_source".into(), serde_json::json!("stale"));
        rec.extra.insert("display_home_score".into(), serde_json::json!(9));

        let out = reconcile_match(&rec, tally(0, 0), TraceMode::Off);
        assert_eq!(out.record.extra.len(), 1);
        assert_eq!(out.record.extra["venue"], serde_json::json!("Emirates"));

        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json.matches("\"score_source\"").count(), 1, "{json}");
        assert_eq!(json.matches("\"score_mismatch\"").count(), 1, "{json}");
        assert!(json.contains("\"score_source\":\"db_no_events\""), "{json}");
        assert!(json.contains("\"display_home_score\":1"), "{json}");
    }

    #[test]
    fn record_passes_through_unchanged() {
        let mut rec = record(Some(1), Some(0));
        rec.status = "HT".into();
        rec.extra.insert("venue".into(), serde_json::json!("Emirates"));
        let out = reconcile_match(&rec, tally(1, 0), TraceMode::Dev);
        assert_eq!(out.record, rec);
    }
}
