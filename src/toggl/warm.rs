//! Best-effort bulk prefetch of workspaces, projects, clients and tags.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::cache::EntityCache;
use super::source::TogglSource;

/// How many workspaces a full warm covers, in listed order.
const WARM_WORKSPACE_LIMIT: usize = 3;

/// What a warm operation covers. Each target has its own in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarmTarget {
  /// The workspace list plus the first few workspaces
  All,
  /// One workspace
  Workspace(u64),
}

impl From<Option<u64>> for WarmTarget {
  fn from(workspace_id: Option<u64>) -> Self {
    workspace_id.map_or(WarmTarget::All, WarmTarget::Workspace)
  }
}

type PendingWarm = Shared<BoxFuture<'static, ()>>;

/// Coordinates warm operations so at most one per target is in flight.
///
/// Concurrent callers for the same target await the same pending operation.
/// The operation runs on its own task, so it finishes and clears its slot even
/// when every caller stops waiting. A later call then warms again.
#[derive(Clone)]
pub struct CacheWarmer {
  source: Arc<dyn TogglSource>,
  cache: Arc<EntityCache>,
  in_flight: Arc<Mutex<HashMap<WarmTarget, PendingWarm>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CacheWarmer {
  pub fn new(source: Arc<dyn TogglSource>, cache: Arc<EntityCache>) -> Self {
    Self {
      source,
      cache,
      in_flight: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// Warm `target`, or join the warm already running for it.
  ///
  /// Never fails; errors are logged and leave the cache partially populated.
  pub async fn warm(&self, target: WarmTarget) {
    let pending = {
      let mut in_flight = lock(&self.in_flight);
      match in_flight.get(&target) {
        Some(pending) => {
          debug!(?target, "joining in-flight cache warm");
          pending.clone()
        }
        None => {
          let pending = self.start(target);
          in_flight.insert(target, pending.clone());
          pending
        }
      }
    };

    pending.await
  }

  pub fn is_warming(&self, target: WarmTarget) -> bool {
    lock(&self.in_flight).contains_key(&target)
  }

  fn start(&self, target: WarmTarget) -> PendingWarm {
    let source = Arc::clone(&self.source);
    let cache = Arc::clone(&self.cache);
    let in_flight = Arc::clone(&self.in_flight);

    let handle = tokio::spawn(async move {
      let _slot = SlotGuard { in_flight, target };
      run_warm(source.as_ref(), &cache, target).await;
    });

    async move {
      if let Err(e) = handle.await {
        warn!(?target, error = %e, "cache warm task failed");
      }
    }
    .boxed()
    .shared()
  }
}

/// Releases a target's in-flight slot when its warm task ends, even by panic.
struct SlotGuard {
  in_flight: Arc<Mutex<HashMap<WarmTarget, PendingWarm>>>,
  target: WarmTarget,
}

impl Drop for SlotGuard {
  fn drop(&mut self) {
    lock(&self.in_flight).remove(&self.target);
  }
}

async fn run_warm(source: &dyn TogglSource, cache: &EntityCache, target: WarmTarget) {
  match target {
    WarmTarget::Workspace(workspace_id) => warm_workspace(source, cache, workspace_id).await,
    WarmTarget::All => {
      let workspaces = match source.get_workspaces().await {
        Ok(workspaces) => workspaces,
        Err(e) => {
          warn!(error = %e, "cache warm failed to list workspaces");
          return;
        }
      };

      let ids: Vec<u64> = workspaces
        .iter()
        .take(WARM_WORKSPACE_LIMIT)
        .map(|w| w.id)
        .collect();
      info!(
        workspaces = workspaces.len(),
        warming = ids.len(),
        "warming cache"
      );
      for workspace in workspaces {
        cache.put(workspace);
      }

      // Sequential across workspaces to stay clear of rate limits.
      for workspace_id in ids {
        warm_workspace(source, cache, workspace_id).await;
      }
    }
  }

  let stats = cache.stats();
  info!(?target, entries = stats.sizes.total(), "cache warm finished");
}

/// Fetch projects, clients and tags of one workspace concurrently.
async fn warm_workspace(source: &dyn TogglSource, cache: &EntityCache, workspace_id: u64) {
  let (projects, clients, tags) = tokio::join!(
    source.get_projects(workspace_id),
    source.get_clients(workspace_id),
    source.get_tags(workspace_id),
  );

  match projects {
    Ok(projects) => {
      debug!(workspace_id, count = projects.len(), "warmed projects");
      projects.into_iter().for_each(|p| cache.put(p));
    }
    Err(e) => warn!(workspace_id, error = %e, "cache warm failed to fetch projects"),
  }
  match clients {
    Ok(clients) => {
      debug!(workspace_id, count = clients.len(), "warmed clients");
      clients.into_iter().for_each(|c| cache.put(c));
    }
    Err(e) => warn!(workspace_id, error = %e, "cache warm failed to fetch clients"),
  }
  match tags {
    Ok(tags) => {
      debug!(workspace_id, count = tags.len(), "warmed tags");
      tags.into_iter().for_each(|t| cache.put(t));
    }
    Err(e) => warn!(workspace_id, error = %e, "cache warm failed to fetch tags"),
  }
}
