use std::collections::HashSet;

use crate::model::{EventRecord, EventType, GoalBreakdown, Side};

/// Identity of a scoring event for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey<'a> {
    minute: Option<i32>,
    player_name: &'a str,
    event_type: EventType,
    side: Side,
}

/// Resolve the side an event belongs to.
///
/// `team` wins when it is exactly `home` or `away`. Otherwise `team_side` is
/// used, then the raw `team` value. Anything that is not `home`/`away` after
/// that is indeterminate.
pub fn resolve_side(team: Option<&str>, team_side: Option<&str>) -> Side {
    let raw = match team {
        Some(t @ ("home" | "away")) => t,
        _ => team_side.filter(|s| !s.is_empty()).or(team).unwrap_or(""),
    };
    match raw {
        "home" => Side::Home,
        "away" => Side::Away,
        other => Side::Indeterminate(other.to_string()),
    }
}

/// Fold one match's events into a deduplicated home/away tally.
///
/// Non-scoring events are skipped without being counted. A scoring event
/// whose (minute, player, type, side) was already seen bumps `duplicates`
/// and contributes nothing else. Own goals credit the opposing side.
pub fn aggregate_goals<'a, I>(events: I) -> GoalBreakdown
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut seen: HashSet<DedupKey<'a>> = HashSet::new();
    let mut breakdown = GoalBreakdown::default();

    for event in events {
        if !event.event_type.is_scoring() {
            continue;
        }

        let side = resolve_side(event.team.as_deref(), event.team_side.as_deref());
        let key = DedupKey {
            minute: event.minute,
            player_name: event.player_name.as_deref().unwrap_or(""),
            event_type: event.event_type,
            side: side.clone(),
        };
        if !seen.insert(key) {
            breakdown.duplicates += 1;
            continue;
        }

        let credited = if event.event_type == EventType::OwnGoal {
            side.opponent()
        } else {
            side
        };
        match credited {
            Side::Home => breakdown.home += 1,
            Side::Away => breakdown.away += 1,
            Side::Indeterminate(_) => {}
        }
    }

    breakdown.total = breakdown.home + breakdown.away;
    breakdown
}
