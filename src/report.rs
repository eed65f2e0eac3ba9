//! Per-project totals over hydrated time entries.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::toggl::types::HydratedTimeEntry;

const NO_PROJECT: &str = "No project";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTotal {
  pub project: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub client: Option<String>,
  pub seconds: i64,
  pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub total_seconds: i64,
  pub projects: Vec<ProjectTotal>,
}

/// Seconds tracked by an entry. Running entries count from their start until `now`.
pub fn entry_seconds(entry: &HydratedTimeEntry, now: DateTime<Utc>) -> i64 {
  if !entry.entry.is_running() {
    return entry.entry.duration;
  }

  DateTime::parse_from_rfc3339(&entry.entry.start)
    .map(|start| (now - start.with_timezone(&Utc)).num_seconds().max(0))
    .unwrap_or(0)
}

/// Group entries by project name and sort the groups by tracked time, highest first.
pub fn project_totals(entries: &[HydratedTimeEntry], now: DateTime<Utc>) -> Report {
  let mut groups: IndexMap<&str, ProjectTotal> = IndexMap::new();

  for entry in entries {
    let project = entry.project_name.as_deref().unwrap_or(NO_PROJECT);
    let seconds = entry_seconds(entry, now);

    let total = groups.entry(project).or_insert_with(|| ProjectTotal {
      project: project.to_string(),
      client: entry.client_name.clone(),
      seconds: 0,
      entries: 0,
    });
    total.seconds += seconds;
    total.entries += 1;
  }

  let mut projects: Vec<ProjectTotal> = groups.into_values().collect();
  projects.sort_by(|a, b| b.seconds.cmp(&a.seconds));

  Report {
    total_seconds: projects.iter().map(|p| p.seconds).sum(),
    projects,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::toggl::stub;

  fn hydrated(project: Option<&str>, duration: i64, start: &str) -> HydratedTimeEntry {
    let mut entry = stub::entry(1, 1, None);
    entry.duration = duration;
    entry.start = start.to_string();
    HydratedTimeEntry {
      entry,
      workspace_name: "Acme".to_string(),
      project_name: project.map(String::from),
      client_id: None,
      client_name: project.map(|_| "Globex".to_string()),
      task_name: None,
      user_name: None,
      tag_names: None,
    }
  }

  fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-04T12:00:00Z")
      .unwrap()
      .with_timezone(&Utc)
  }

  #[test]
  fn test_groups_and_sorts() {
    let entries = [
      hydrated(Some("Website"), 600, "2024-03-04T08:00:00Z"),
      hydrated(None, 300, "2024-03-04T08:00:00Z"),
      hydrated(Some("Mobile"), 1200, "2024-03-04T08:00:00Z"),
      hydrated(Some("Website"), 900, "2024-03-04T09:00:00Z"),
    ];

    let report = project_totals(&entries, now());
    assert_eq!(report.total_seconds, 3000);
    let names: Vec<_> = report.projects.iter().map(|p| p.project.as_str()).collect();
    assert_eq!(names, vec!["Website", "Mobile", "No project"]);
    assert_eq!(report.projects[0].entries, 2);
    assert_eq!(report.projects[0].client.as_deref(), Some("Globex"));
    assert_eq!(report.projects[2].client, None);
  }

  #[test]
  fn test_running_entry_counts_until_now() {
    let running = hydrated(Some("Website"), -1_709_542_800, "2024-03-04T11:30:00Z");
    assert_eq!(entry_seconds(&running, now()), 1800);

    let unparseable = hydrated(Some("Website"), -1, "yesterday");
    assert_eq!(entry_seconds(&unparseable, now()), 0);
  }
}
