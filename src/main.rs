use chrono::{DateTime, Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use toggl_hydrate::config::Config;
use toggl_hydrate::report;
use toggl_hydrate::timeline::TimelineQuery;
use toggl_hydrate::toggl::CachedToggl;

#[derive(Parser, Debug)]
#[command(name = "toggl-hydrate")]
#[command(about = "Hydrated, cached access to Toggl Track time entries")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/toggl-hydrate/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print hydrated time entries as JSON
  Entries {
    #[command(flatten)]
    range: DateRange,
    /// Skip warming the cache first
    #[arg(long)]
    no_warm: bool,
    /// Print cache statistics to stderr afterwards
    #[arg(long)]
    stats: bool,
  },
  /// Print tracked time per project
  Report {
    #[command(flatten)]
    range: DateRange,
  },
  /// Warm the cache and print its statistics
  Warm {
    /// Only warm this workspace
    #[arg(short, long)]
    workspace: Option<u64>,
  },
  /// Summarize desktop timeline activity
  Timeline {
    /// Window start (unix seconds)
    #[arg(long)]
    start: Option<i64>,
    /// Window end (unix seconds)
    #[arg(long)]
    end: Option<i64>,
    /// Only count applications whose name contains this (case-insensitive)
    #[arg(long)]
    app: Option<String>,
    /// Include the matching events in the output
    #[arg(long)]
    events: bool,
    /// Maximum number of events to include (1-1000)
    #[arg(long)]
    limit: Option<usize>,
  },
}

#[derive(clap::Args, Debug)]
struct DateRange {
  /// First day (YYYY-MM-DD, default: today)
  #[arg(long)]
  start: Option<NaiveDate>,
  /// Day after the last day (YYYY-MM-DD, default: the day after start)
  #[arg(long)]
  end: Option<NaiveDate>,
}

impl DateRange {
  fn resolve(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = self.start.unwrap_or_else(|| Utc::now().date_naive());
    let end = match self.end {
      Some(end) => end,
      None => start
        .checked_add_days(Days::new(1))
        .ok_or_else(|| eyre!("Date out of range: {}", start))?,
    };
    if end <= start {
      return Err(eyre!("--end ({}) must be after --start ({})", end, start));
    }
    Ok((midnight(start), midnight(end)))
  }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
  date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn print_json(value: &impl Serialize) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = toggl_hydrate::logging::init(&config.log)?;

  let toggl = CachedToggl::from_config(&config)?;

  match args.command {
    Command::Entries {
      range,
      no_warm,
      stats,
    } => {
      let (start, end) = range.resolve()?;
      if config.cache.warm_on_start && !no_warm {
        toggl.warm_cache(config.toggl.default_workspace).await;
      }
      let entries = toggl.time_entries(start, end).await?;
      info!(count = entries.len(), "hydrated time entries");
      print_json(&entries)?;
      if stats {
        eprintln!("{}", serde_json::to_string_pretty(&toggl.get_stats())?);
      }
    }
    Command::Report { range } => {
      let (start, end) = range.resolve()?;
      if config.cache.warm_on_start {
        toggl.warm_cache(config.toggl.default_workspace).await;
      }
      let entries = toggl.time_entries(start, end).await?;
      print_json(&report::project_totals(&entries, Utc::now()))?;
    }
    Command::Warm { workspace } => {
      toggl
        .warm_cache(workspace.or(config.toggl.default_workspace))
        .await;
      print_json(&toggl.get_stats())?;
    }
    Command::Timeline {
      start,
      end,
      app,
      events,
      limit,
    } => {
      let query = TimelineQuery {
        start,
        end,
        app_filter: app,
        include_events: events,
        limit,
      };
      print_json(&toggl.timeline(&query).await?)?;
    }
  }

  Ok(())
}
