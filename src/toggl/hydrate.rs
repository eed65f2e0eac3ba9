//! Resolves the foreign keys of time entries into display names.

use color_eyre::Result;
use futures::future::join_all;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::Cacheable;

use super::cache::{EntityCache, Partitioned};
use super::source::TogglSource;
use super::types::{Client, HydratedTimeEntry, Project, Task, TimeEntry, User, Workspace};

/// Hydrates time entries against the entity cache, fetching misses upstream.
///
/// Resolution failures never fail a hydration: the affected field gets a
/// placeholder name (or, for tags, the tag is skipped) and a warning is logged.
#[derive(Clone)]
pub struct Hydrator {
  source: Arc<dyn TogglSource>,
  cache: Arc<EntityCache>,
}

impl Hydrator {
  pub fn new(source: Arc<dyn TogglSource>, cache: Arc<EntityCache>) -> Self {
    Self { source, cache }
  }

  /// Hydrate `entries`, returning one record per entry in the same order.
  ///
  /// Distinct uncached projects are fetched concurrently up front, one request
  /// per project. Everything else resolves entry by entry through the cache.
  pub async fn hydrate(&self, entries: &[TimeEntry]) -> Vec<HydratedTimeEntry> {
    let unavailable = self.prefetch_projects(entries).await;

    let mut hydrated = Vec::with_capacity(entries.len());
    for entry in entries {
      hydrated.push(self.hydrate_entry(entry, &unavailable).await);
    }
    hydrated
  }

  /// Returns the project ids that could not be fetched.
  async fn prefetch_projects(&self, entries: &[TimeEntry]) -> HashSet<u64> {
    let mut seen = HashSet::new();
    let missing: Vec<(u64, u64)> = entries
      .iter()
      .filter_map(|e| e.project_id.map(|id| (e.workspace_id, id)))
      .filter(|&(_, id)| seen.insert(id))
      .filter(|&(_, id)| !self.cache.contains::<Project>(id))
      .collect();

    if missing.is_empty() {
      return HashSet::new();
    }
    debug!(count = missing.len(), "prefetching projects");

    let results = join_all(missing.into_iter().map(|(workspace_id, id)| async move {
      (id, self.source.get_project(workspace_id, id).await)
    }))
    .await;

    let mut unavailable = HashSet::new();
    for (id, result) in results {
      match result {
        Ok(project) => self.cache.put(project),
        Err(e) => {
          warn!(project_id = id, error = %e, "failed to prefetch project");
          unavailable.insert(id);
        }
      }
    }
    unavailable
  }

  async fn hydrate_entry(
    &self,
    entry: &TimeEntry,
    unavailable: &HashSet<u64>,
  ) -> HydratedTimeEntry {
    let workspace_id = entry.workspace_id;

    let workspace_name = self
      .resolve(workspace_id, || self.source.get_workspace(workspace_id))
      .await
      .map(|w: Workspace| w.name)
      .unwrap_or_else(|| Workspace::placeholder(workspace_id));

    let mut project_name = None;
    let mut client_id = None;
    let mut client_name = None;
    if let Some(project_id) = entry.project_id {
      // A failed prefetch is not retried within the same call, but the
      // lookup still counts as a miss.
      let project = if unavailable.contains(&project_id) {
        self.cache.get::<Project>(project_id)
      } else {
        self
          .resolve(project_id, || {
            self.source.get_project(workspace_id, project_id)
          })
          .await
      };

      match project {
        Some(project) => {
          if let Some(cid) = project.client_id {
            let name = self
              .resolve(cid, || self.source.get_client(workspace_id, cid))
              .await
              .map(|c: Client| c.name)
              .unwrap_or_else(|| Client::placeholder(cid));
            client_id = Some(cid);
            client_name = Some(name);
          }
          project_name = Some(project.name);
        }
        None => project_name = Some(Project::placeholder(project_id)),
      }
    }

    let task_name = match (entry.task_id, entry.project_id) {
      (Some(task_id), Some(project_id)) => Some(
        self
          .resolve(task_id, || {
            self.source.get_task(task_id, workspace_id, project_id)
          })
          .await
          .map(|t: Task| t.name)
          .unwrap_or_else(|| Task::placeholder(task_id)),
      ),
      _ => None,
    };

    let user_name = match entry.user_id {
      Some(user_id) => Some(
        self
          .resolve(user_id, || self.source.get_user(workspace_id, user_id))
          .await
          .map(|u: User| u.name)
          .unwrap_or_else(|| User::placeholder(user_id)),
      ),
      None => None,
    };

    let tag_names = match entry.tag_ids.as_deref() {
      Some(ids) if !ids.is_empty() => {
        let mut names = Vec::with_capacity(ids.len());
        for &tag_id in ids {
          if let Some(tag) = self
            .resolve(tag_id, || self.source.get_tag(tag_id, workspace_id))
            .await
          {
            names.push(tag.name);
          }
        }
        Some(names)
      }
      _ => None,
    };

    HydratedTimeEntry {
      entry: entry.clone(),
      workspace_name,
      project_name,
      client_id,
      client_name,
      task_name,
      user_name,
      tag_names,
    }
  }

  /// Cache-or-fetch a single entity, logging and swallowing failures.
  async fn resolve<T, F, Fut>(&self, id: u64, fetcher: F) -> Option<T>
  where
    T: Partitioned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    match self.cache.fetch_one(id, fetcher).await {
      Ok(entity) => Some(entity),
      Err(e) => {
        warn!(kind = T::entity_type(), id, error = %e, "failed to resolve");
        None
      }
    }
  }
}
