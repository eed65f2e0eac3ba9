use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::config::Config;

use super::source::TogglSource;
use super::types::{Client, Project, Tag, Task, TimeEntry, TimelineEvent, User, Workspace};

/// Toggl Track API client
#[derive(Clone)]
pub struct TogglClient {
  http: reqwest::Client,
  base_url: Url,
  token: String,
}

impl TogglClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    Self::with_token(&config.toggl.api_url, token)
  }

  pub fn with_token(api_url: &str, token: String) -> Result<Self> {
    let mut base_url =
      Url::parse(api_url).map_err(|e| eyre!("Invalid Toggl API url {}: {}", api_url, e))?;

    // Url::join replaces the last segment unless the base ends in a slash.
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("toggl-hydrate/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      token,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base_url
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))
  }

  async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    let url = self.endpoint(path)?;

    let response = self
      .http
      .get(url)
      .basic_auth(&self.token, Some("api_token"))
      .query(query)
      .send()
      .await
      .map_err(|e| eyre!("Failed to GET {}: {}", path, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("GET {} returned {}", path, status));
    }

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", path, e))
  }

  /// List endpoints answer `null` instead of `[]` when there is nothing to return.
  async fn get_list<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Vec<T>> {
    let list: Option<Vec<T>> = self.get(path, query).await?;
    Ok(list.unwrap_or_default())
  }
}

#[async_trait]
impl TogglSource for TogglClient {
  async fn get_workspace(&self, id: u64) -> Result<Workspace> {
    self.get(&format!("workspaces/{}", id), &[]).await
  }

  async fn get_workspaces(&self) -> Result<Vec<Workspace>> {
    self.get_list("workspaces", &[]).await
  }

  async fn get_project(&self, workspace_id: u64, id: u64) -> Result<Project> {
    self
      .get(&format!("workspaces/{}/projects/{}", workspace_id, id), &[])
      .await
  }

  async fn get_projects(&self, workspace_id: u64) -> Result<Vec<Project>> {
    self
      .get_list(&format!("workspaces/{}/projects", workspace_id), &[])
      .await
  }

  async fn get_client(&self, workspace_id: u64, id: u64) -> Result<Client> {
    self
      .get(&format!("workspaces/{}/clients/{}", workspace_id, id), &[])
      .await
  }

  async fn get_clients(&self, workspace_id: u64) -> Result<Vec<Client>> {
    self
      .get_list(&format!("workspaces/{}/clients", workspace_id), &[])
      .await
  }

  async fn get_task(&self, id: u64, workspace_id: u64, project_id: u64) -> Result<Task> {
    self
      .get(
        &format!(
          "workspaces/{}/projects/{}/tasks/{}",
          workspace_id, project_id, id
        ),
        &[],
      )
      .await
  }

  async fn get_tasks(&self, workspace_id: u64, project_id: u64) -> Result<Vec<Task>> {
    self
      .get_list(
        &format!("workspaces/{}/projects/{}/tasks", workspace_id, project_id),
        &[],
      )
      .await
  }

  async fn get_user(&self, workspace_id: u64, id: u64) -> Result<User> {
    let users: Vec<User> = self
      .get_list(&format!("workspaces/{}/users", workspace_id), &[])
      .await?;

    users
      .into_iter()
      .find(|u| u.id == id)
      .ok_or_else(|| eyre!("User {} not found in workspace {}", id, workspace_id))
  }

  async fn get_tag(&self, id: u64, workspace_id: u64) -> Result<Tag> {
    // There is no single-tag endpoint.
    self
      .get_tags(workspace_id)
      .await?
      .into_iter()
      .find(|t| t.id == id)
      .ok_or_else(|| eyre!("Tag {} not found in workspace {}", id, workspace_id))
  }

  async fn get_tags(&self, workspace_id: u64) -> Result<Vec<Tag>> {
    self
      .get_list(&format!("workspaces/{}/tags", workspace_id), &[])
      .await
  }

  async fn get_time_entries(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<TimeEntry>> {
    let query = [
      (
        "start_date",
        start.to_rfc3339_opts(SecondsFormat::Secs, true),
      ),
      ("end_date", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
    ];
    self.get_list("me/time_entries", &query).await
  }

  async fn get_timeline(&self) -> Result<Vec<TimelineEvent>> {
    self.get_list("timeline", &[]).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_keeps_api_version_segment() {
    let client = TogglClient::with_token(crate::config::DEFAULT_API_URL, "t".into()).unwrap();
    let url = client.endpoint("workspaces/1/projects/2").unwrap();
    assert_eq!(
      url.as_str(),
      "https://api.track.toggl.com/api/v9/workspaces/1/projects/2"
    );
  }

  #[test]
  fn test_base_with_trailing_slash() {
    let client = TogglClient::with_token("http://localhost:8080/api/", "t".into()).unwrap();
    let url = client.endpoint("me/time_entries").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/api/me/time_entries");
  }

  #[test]
  fn test_invalid_base_url() {
    assert!(TogglClient::with_token("not a url", "t".into()).is_err());
  }
}
