//! Window filtering and per-application aggregation of timeline events.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::toggl::types::TimelineEvent;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 1000;

const UNKNOWN_APP: &str = "Unknown";

/// Parameters of a timeline summary. All fields are advisory; bad values are clamped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineQuery {
  /// Window start, unix seconds
  pub start: Option<i64>,
  /// Window end, unix seconds
  pub end: Option<i64>,
  /// Case-insensitive substring matched against the application name
  pub app_filter: Option<String>,
  #[serde(default)]
  pub include_events: bool,
  pub limit: Option<usize>,
}

impl TimelineQuery {
  /// Requested limit clamped to `1..=MAX_LIMIT`.
  pub fn effective_limit(&self) -> usize {
    self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSummary {
  pub total_events: usize,
  pub returned_events: usize,
  pub truncated: bool,
  pub total_seconds: i64,
  /// Seconds per application, highest first
  pub summary: IndexMap<String, i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub events: Option<Vec<TimelineEvent>>,
}

/// Application name of an event, "Unknown" when the event has no filename.
pub fn app_name(event: &TimelineEvent) -> &str {
  event.filename.as_deref().unwrap_or(UNKNOWN_APP)
}

/// Summarize `events` in a single pass, treating still-active events as ending at `now`.
///
/// An event is counted when its interval overlaps the window. Durations are
/// clipped to the window. `summary` and `total_seconds` always cover every
/// matching event, even when the returned event list is truncated.
pub fn summarize(events: &[TimelineEvent], query: &TimelineQuery, now: i64) -> TimelineSummary {
  let limit = query.effective_limit();
  let filter = query.app_filter.as_deref().map(str::to_lowercase);

  let mut total_events = 0;
  let mut total_seconds = 0;
  let mut by_app: IndexMap<String, i64> = IndexMap::new();
  let mut returned = Vec::new();

  for event in events {
    let effective_end = event.end_time.unwrap_or(now);

    if query.start.is_some_and(|start| effective_end < start) {
      continue;
    }
    if query.end.is_some_and(|end| event.start_time >= end) {
      continue;
    }

    let app = app_name(event);
    if let Some(filter) = &filter {
      if !app.to_lowercase().contains(filter.as_str()) {
        continue;
      }
    }

    let clipped_start = event.start_time.max(query.start.unwrap_or(event.start_time));
    let clipped_end = effective_end.min(query.end.unwrap_or(effective_end));
    let seconds = (clipped_end - clipped_start).max(0);

    total_events += 1;
    total_seconds += seconds;
    *by_app.entry(app.to_string()).or_insert(0) += seconds;

    if query.include_events && returned.len() < limit {
      returned.push(event.clone());
    }
  }

  // Stable sort: ties keep first-seen order.
  by_app.sort_by(|_, a, _, b| b.cmp(a));

  let returned_events = returned.len();
  TimelineSummary {
    total_events,
    returned_events,
    truncated: query.include_events && total_events > returned_events,
    total_seconds,
    summary: by_app,
    events: query.include_events.then_some(returned),
  }
}
