use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::Result;

use super::types::{Client, Project, Tag, Task, TimeEntry, TimelineEvent, User, Workspace};

/// Upstream data source for Toggl entities.
///
/// Every error (network, not found, auth) is treated the same by callers:
/// the requested entity is unresolvable.
#[async_trait]
pub trait TogglSource: Send + Sync {
  async fn get_workspace(&self, id: u64) -> Result<Workspace>;
  async fn get_workspaces(&self) -> Result<Vec<Workspace>>;

  async fn get_project(&self, workspace_id: u64, id: u64) -> Result<Project>;
  async fn get_projects(&self, workspace_id: u64) -> Result<Vec<Project>>;

  async fn get_client(&self, workspace_id: u64, id: u64) -> Result<Client>;
  async fn get_clients(&self, workspace_id: u64) -> Result<Vec<Client>>;

  async fn get_task(&self, id: u64, workspace_id: u64, project_id: u64) -> Result<Task>;
  async fn get_tasks(&self, workspace_id: u64, project_id: u64) -> Result<Vec<Task>>;

  async fn get_user(&self, workspace_id: u64, id: u64) -> Result<User>;

  async fn get_tag(&self, id: u64, workspace_id: u64) -> Result<Tag>;
  async fn get_tags(&self, workspace_id: u64) -> Result<Vec<Tag>>;

  /// Time entries of the authenticated user that started within `[start, end)`.
  async fn get_time_entries(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<TimeEntry>>;

  /// Desktop activity events recorded for the authenticated user.
  async fn get_timeline(&self) -> Result<Vec<TimelineEvent>>;
}
