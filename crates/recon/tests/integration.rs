use std::path::PathBuf;

use scoreline_recon::config::ReconConfig;
use scoreline_recon::engine::{load_input, run};
use scoreline_recon::model::{ReconResult, ScoreSource};
use scoreline_recon::EnrichedMatch;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_and_run(config_file: &str) -> (ReconConfig, ReconResult) {
    let dir = fixtures_dir();
    let toml = std::fs::read_to_string(dir.join(config_file)).unwrap();
    let config = ReconConfig::from_toml(&toml).unwrap();
    let input = load_input(&config, &dir).unwrap();
    let result = run(&config, &input);
    (config, result)
}

fn by_id<'a>(result: &'a ReconResult, id: &str) -> &'a EnrichedMatch {
    result
        .matches
        .iter()
        .find(|m| m.record.id == id)
        .unwrap_or_else(|| panic!("match {id} missing from output"))
}

fn assert_matchday(result: &ReconResult) {
    let ids: Vec<_> = result.matches.iter().map(|m| m.record.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C", "D", "E", "F"]);

    // A: provider 2-1, events 2-1 plus one duplicate report
    let a = by_id(result, "A");
    assert_eq!(a.score_source, ScoreSource::DbAligned);
    assert!(!a.score_mismatch);
    assert_eq!((a.display_home_score, a.display_away_score), (Some(2), Some(1)));
    assert_eq!(a.event_goal_breakdown.duplicates, 1);
    assert_eq!(a.event_goal_breakdown.total, 3);

    // B: provider 1-1, events 2-1, provider still shown
    let b = by_id(result, "B");
    assert_eq!(b.score_source, ScoreSource::DbMismatchEvents);
    assert!(b.score_mismatch);
    assert_eq!((b.display_home_score, b.display_away_score), (Some(1), Some(1)));
    assert_eq!((b.event_score_home, b.event_score_away), (2, 1));

    // C: no provider score, own goal by the away side credits home
    let c = by_id(result, "C");
    assert_eq!(c.score_source, ScoreSource::EventsFallback);
    assert_eq!((c.display_home_score, c.display_away_score), (Some(2), Some(0)));

    // D: partial provider score never reaches a mismatch branch
    let d = by_id(result, "D");
    assert_eq!(d.score_source, ScoreSource::EventsFallback);
    assert!(!d.score_mismatch);
    assert_eq!((d.display_home_score, d.display_away_score), (Some(0), Some(1)));

    let e = by_id(result, "E");
    assert_eq!(e.score_source, ScoreSource::DbNoEvents);
    assert_eq!((e.display_home_score, e.display_away_score), (Some(3), Some(0)));

    let f = by_id(result, "F");
    assert_eq!(f.score_source, ScoreSource::DbMissingNoEvents);
    assert_eq!((f.display_home_score, f.display_away_score), (None, None));

    let s = &result.summary;
    assert_eq!(s.total_matches, 6);
    assert_eq!(s.mismatches, 1);
    assert_eq!(s.duplicate_events, 1);
    assert_eq!(s.orphan_events, 1);
    assert_eq!(s.source_counts["db_aligned"], 1);
    assert_eq!(s.source_counts["db_mismatch_events"], 1);
    assert_eq!(s.source_counts["events_fallback"], 2);
    assert_eq!(s.source_counts["db_no_events"], 1);
    assert_eq!(s.source_counts["db_missing_no_events"], 1);
}

// -------------------------------------------------------------------------
// Fixture runs
// -------------------------------------------------------------------------

#[test]
fn csv_matchday() {
    let (config, result) = load_and_run("matchday.recon.toml");
    assert!(!config.fail_on_mismatch);
    assert_eq!(result.meta.config_name, "Matchday 12");
    assert!(!result.meta.parallel);
    assert_matchday(&result);
}

#[test]
fn json_matchday_parallel() {
    let (config, result) = load_and_run("matchday-json.recon.toml");
    assert!(config.fail_on_mismatch);
    assert!(result.meta.parallel);
    assert_matchday(&result);
}

#[test]
fn csv_and_json_agree() {
    let (_, csv) = load_and_run("matchday.recon.toml");
    let (_, json) = load_and_run("matchday-json.recon.toml");
    for (c, j) in csv.matches.iter().zip(&json.matches) {
        assert_eq!(c.score_source, j.score_source);
        assert_eq!(c.event_goal_breakdown, j.event_goal_breakdown);
        assert_eq!(c.display_home_score, j.display_home_score);
        assert_eq!(c.display_away_score, j.display_away_score);
    }
}

// -------------------------------------------------------------------------
// Output contract
// -------------------------------------------------------------------------

#[test]
fn enriched_json_shape() {
    let (_, result) = load_and_run("matchday.recon.toml");
    let json = serde_json::to_value(&result).unwrap();

    let b = &json["matches"][1];
    assert_eq!(b["id"], "B");
    assert_eq!(b["status"], "FT");
    assert_eq!(b["home_team"], "Chelsea");
    assert_eq!(b["home_score"], 1);
    assert_eq!(b["display_home_score"], 1);
    assert_eq!(b["display_away_score"], 1);
    assert_eq!(b["score_mismatch"], true);
    assert_eq!(b["score_source"], "db_mismatch_events");
    assert_eq!(b["event_score_home"], 2);
    assert_eq!(b["event_score_away"], 1);
    assert_eq!(
        b["event_goal_breakdown"],
        serde_json::json!({"home": 2, "away": 1, "total": 3, "duplicates": 0})
    );

    let f = &json["matches"][5];
    assert!(f["display_home_score"].is_null());
    assert!(f["home_score"].is_null());

    assert_eq!(json["summary"]["orphan_events"], 1);
    assert!(json["meta"]["run_at"].is_string());
}

#[test]
fn missing_input_file_is_io_error() {
    let toml = r#"
name = "Missing"
[inputs.matches]
file = "does-not-exist.csv"
[inputs.events]
file = "events.csv"
"#;
    let config = ReconConfig::from_toml(toml).unwrap();
    let err = load_input(&config, &fixtures_dir()).unwrap_err();
    assert!(err.to_string().contains("does-not-exist.csv"));
}

#[test]
fn renamed_columns_from_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("fixtures.csv"),
        "fixture,state,hg,ag\nX,FT,1,0\nY,FT,0,0\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("feed.csv"),
        "game,kind,side\nX,goal,home\nY,own_goal,home\n",
    )
    .unwrap();

    let toml = r#"
name = "Renamed"

[inputs.matches]
file = "fixtures.csv"
[inputs.matches.columns]
id = "fixture"
status = "state"
home_score = "hg"
away_score = "ag"

[inputs.events]
file = "feed.csv"
[inputs.events.columns]
match_id = "game"
event_type = "kind"
team = "side"
"#;
    let config = ReconConfig::from_toml(toml).unwrap();
    let input = load_input(&config, dir.path()).unwrap();
    let result = run(&config, &input);

    assert_eq!(result.matches[0].score_source, ScoreSource::DbAligned);
    // Own goal by home credits away: events 0-1 vs provider 0-0
    assert_eq!(result.matches[1].score_source, ScoreSource::DbMismatchEvents);
    assert_eq!(result.matches[1].event_score_away, 1);
    assert_eq!(result.summary.mismatches, 1);
}
