//! Cached, hydrated access to the Toggl Track API.
//!
//! Time entries reference workspaces, projects, clients, tasks, users and tags
//! by numeric id. `CachedToggl` resolves those ids to names through a
//! TTL-bounded in-memory cache, warms that cache in bulk, and summarizes
//! desktop timeline activity.

pub mod cache;
pub mod config;
pub mod logging;
pub mod report;
pub mod timeline;
pub mod toggl;
