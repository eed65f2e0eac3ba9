//! In-memory `TogglSource` that counts calls, for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::source::TogglSource;
use super::types::{Client, Project, Tag, Task, TimeEntry, TimelineEvent, User, Workspace};

#[derive(Default)]
pub struct StubSource {
  pub workspaces: Vec<Workspace>,
  pub projects: Vec<Project>,
  pub clients: Vec<Client>,
  pub tasks: Vec<Task>,
  pub users: Vec<User>,
  pub tags: Vec<Tag>,
  pub time_entries: Vec<TimeEntry>,
  pub timeline: Vec<TimelineEvent>,
  /// Methods that always fail, e.g. "get_workspaces"
  pub failing_methods: HashSet<&'static str>,
  /// Project ids whose lookup fails
  pub failing_projects: HashSet<u64>,
  pub call_counts: Mutex<HashMap<&'static str, usize>>,
}

impl StubSource {
  pub fn calls(&self, method: &str) -> usize {
    self.call_counts.lock().unwrap().get(method).copied().unwrap_or(0)
  }

  pub fn total_calls(&self) -> usize {
    self.call_counts.lock().unwrap().values().sum()
  }

  /// Record the call and yield once so concurrent callers interleave.
  async fn enter(&self, method: &'static str) -> Result<()> {
    *self.call_counts.lock().unwrap().entry(method).or_default() += 1;
    tokio::task::yield_now().await;
    if self.failing_methods.contains(method) {
      return Err(eyre!("{} failed", method));
    }
    Ok(())
  }
}

fn found<T: Clone>(items: &[T], pred: impl Fn(&T) -> bool, what: &str, id: u64) -> Result<T> {
  items
    .iter()
    .find(|item| pred(item))
    .cloned()
    .ok_or_else(|| eyre!("{} {} not found", what, id))
}

#[async_trait]
impl TogglSource for StubSource {
  async fn get_workspace(&self, id: u64) -> Result<Workspace> {
    self.enter("get_workspace").await?;
    found(&self.workspaces, |w| w.id == id, "workspace", id)
  }

  async fn get_workspaces(&self) -> Result<Vec<Workspace>> {
    self.enter("get_workspaces").await?;
    Ok(self.workspaces.clone())
  }

  async fn get_project(&self, _workspace_id: u64, id: u64) -> Result<Project> {
    self.enter("get_project").await?;
    if self.failing_projects.contains(&id) {
      return Err(eyre!("project {} unavailable", id));
    }
    found(&self.projects, |p| p.id == id, "project", id)
  }

  async fn get_projects(&self, workspace_id: u64) -> Result<Vec<Project>> {
    self.enter("get_projects").await?;
    Ok(
      self
        .projects
        .iter()
        .filter(|p| p.workspace_id == workspace_id)
        .cloned()
        .collect(),
    )
  }

  async fn get_client(&self, _workspace_id: u64, id: u64) -> Result<Client> {
    self.enter("get_client").await?;
    found(&self.clients, |c| c.id == id, "client", id)
  }

  async fn get_clients(&self, workspace_id: u64) -> Result<Vec<Client>> {
    self.enter("get_clients").await?;
    Ok(
      self
        .clients
        .iter()
        .filter(|c| c.workspace_id == Some(workspace_id))
        .cloned()
        .collect(),
    )
  }

  async fn get_task(&self, id: u64, _workspace_id: u64, _project_id: u64) -> Result<Task> {
    self.enter("get_task").await?;
    found(&self.tasks, |t| t.id == id, "task", id)
  }

  async fn get_tasks(&self, workspace_id: u64, project_id: u64) -> Result<Vec<Task>> {
    self.enter("get_tasks").await?;
    Ok(
      self
        .tasks
        .iter()
        .filter(|t| t.workspace_id == workspace_id && t.project_id == project_id)
        .cloned()
        .collect(),
    )
  }

  async fn get_user(&self, _workspace_id: u64, id: u64) -> Result<User> {
    self.enter("get_user").await?;
    found(&self.users, |u| u.id == id, "user", id)
  }

  async fn get_tag(&self, id: u64, _workspace_id: u64) -> Result<Tag> {
    self.enter("get_tag").await?;
    found(&self.tags, |t| t.id == id, "tag", id)
  }

  async fn get_tags(&self, workspace_id: u64) -> Result<Vec<Tag>> {
    self.enter("get_tags").await?;
    Ok(
      self
        .tags
        .iter()
        .filter(|t| t.workspace_id == workspace_id)
        .cloned()
        .collect(),
    )
  }

  async fn get_time_entries(
    &self,
    _start: DateTime<Utc>,
    _end: DateTime<Utc>,
  ) -> Result<Vec<TimeEntry>> {
    self.enter("get_time_entries").await?;
    Ok(self.time_entries.clone())
  }

  async fn get_timeline(&self) -> Result<Vec<TimelineEvent>> {
    self.enter("get_timeline").await?;
    Ok(self.timeline.clone())
  }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn workspace(id: u64, name: &str) -> Workspace {
  Workspace {
    id,
    name: name.to_string(),
  }
}

pub fn project(id: u64, workspace_id: u64, name: &str, client_id: Option<u64>) -> Project {
  Project {
    id,
    workspace_id,
    name: name.to_string(),
    client_id,
    active: true,
    color: None,
  }
}

pub fn client(id: u64, workspace_id: u64, name: &str) -> Client {
  Client {
    id,
    workspace_id: Some(workspace_id),
    name: name.to_string(),
  }
}

pub fn tag(id: u64, workspace_id: u64, name: &str) -> Tag {
  Tag {
    id,
    workspace_id,
    name: name.to_string(),
  }
}

pub fn entry(id: u64, workspace_id: u64, project_id: Option<u64>) -> TimeEntry {
  TimeEntry {
    id,
    workspace_id,
    project_id,
    task_id: None,
    user_id: None,
    description: None,
    start: "2024-03-04T09:00:00Z".to_string(),
    stop: Some("2024-03-04T10:00:00Z".to_string()),
    duration: 3600,
    tags: None,
    tag_ids: None,
    billable: false,
  }
}
