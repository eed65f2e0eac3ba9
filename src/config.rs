use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.track.toggl.com/api/v9";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub toggl: TogglConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TogglConfig {
  #[serde(default = "default_api_url")]
  pub api_url: String,
  /// Workspace warmed at startup instead of the first few listed workspaces
  pub default_workspace: Option<u64>,
}

impl Default for TogglConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      default_workspace: None,
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Entry time-to-live in milliseconds
  pub ttl_ms: u64,
  /// Total entry budget, split evenly across the six entity kinds
  pub max_size: usize,
  /// Advisory batch size for bulk fetches
  pub batch_size: usize,
  /// Warm the cache before the first hydration
  pub warm_on_start: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_ms: 3_600_000,
      max_size: 1000,
      batch_size: 100,
      warm_on_start: true,
    }
  }
}

impl CacheConfig {
  pub fn ttl(&self) -> Duration {
    Duration::from_millis(self.ttl_ms)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Write logs to this file instead of stderr
  pub file: Option<PathBuf>,
  /// Default filter when RUST_LOG is unset
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: "info".to_string(),
    }
  }
}

impl Config {
  /// Load configuration from file, then apply environment overrides.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./toggl-hydrate.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/toggl-hydrate/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok())?;

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("toggl-hydrate.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("toggl-hydrate").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    // An empty document deserializes as null.
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Apply TOGGL_CACHE_TTL, TOGGL_CACHE_SIZE and TOGGL_BATCH_SIZE.
  fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(ttl) = var("TOGGL_CACHE_TTL") {
      self.cache.ttl_ms = parse_env("TOGGL_CACHE_TTL", &ttl)?;
    }
    if let Some(size) = var("TOGGL_CACHE_SIZE") {
      self.cache.max_size = parse_env("TOGGL_CACHE_SIZE", &size)?;
    }
    if let Some(batch) = var("TOGGL_BATCH_SIZE") {
      self.cache.batch_size = parse_env("TOGGL_BATCH_SIZE", &batch)?;
    }
    Ok(())
  }

  /// Get the Toggl API token from environment variables.
  ///
  /// Checks TOGGL_API_TOKEN first, then TOGGL_API_KEY as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("TOGGL_API_TOKEN")
      .or_else(|_| std::env::var("TOGGL_API_KEY"))
      .map_err(|_| {
        eyre!(
          "Toggl API token not found. Set TOGGL_API_TOKEN or TOGGL_API_KEY environment variable."
        )
      })
  }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
  value
    .trim()
    .parse()
    .map_err(|_| eyre!("Invalid value for {}: {:?}", key, value))
}
