use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
  pub id: u64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
  pub id: u64,
  pub workspace_id: u64,
  pub name: String,
  pub client_id: Option<u64>,
  #[serde(default)]
  pub active: bool,
  pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
  pub id: u64,
  #[serde(alias = "wid")]
  pub workspace_id: Option<u64>,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub id: u64,
  pub name: String,
  pub project_id: u64,
  pub workspace_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  #[serde(alias = "fullname")]
  pub name: String,
  pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
  pub id: u64,
  pub workspace_id: u64,
  pub name: String,
}

/// Raw time entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
  pub id: u64,
  pub workspace_id: u64,
  pub project_id: Option<u64>,
  pub task_id: Option<u64>,
  pub user_id: Option<u64>,
  pub description: Option<String>,
  /// ISO 8601 start timestamp
  pub start: String,
  pub stop: Option<String>,
  /// Seconds. Negative while the entry is running; the magnitude is meaningless then.
  pub duration: i64,
  pub tags: Option<Vec<String>>,
  pub tag_ids: Option<Vec<u64>>,
  #[serde(default)]
  pub billable: bool,
}

impl TimeEntry {
  pub fn is_running(&self) -> bool {
    self.duration < 0
  }
}

/// Time entry with its foreign keys resolved to display names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydratedTimeEntry {
  #[serde(flatten)]
  pub entry: TimeEntry,
  pub workspace_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub project_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub client_id: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub client_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub task_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag_names: Option<Vec<String>>,
}

/// Desktop activity event from the timeline endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
  pub id: u64,
  /// Unix seconds
  pub start_time: i64,
  /// Unix seconds, `None` while the event is still active
  pub end_time: Option<i64>,
  pub desktop_id: Option<String>,
  pub filename: Option<String>,
  pub title: Option<String>,
  #[serde(default)]
  pub idle: bool,
}
