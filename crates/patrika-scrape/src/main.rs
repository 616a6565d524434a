//! `patrika`: scrape Nepal Kanun Patrika decisions into SQLite.
//!
//! # Usage
//!
//! ```
//! patrika --case-type रिट --year २०७३
//! patrika --case-type 1 --case-type 5 --year 2073 --skip-existing
//! patrika --test-link https://nkp.gov.np/full_detail/9542
//! patrika --test-saved --case-type 5 --limit 20
//! patrika --retry-failed --year 2073
//! ```

use std::{
  path::PathBuf,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use anyhow::{Context as _, bail};
use clap::Parser;
use patrika_core::{case::CaseType, layout::Layout, numerals};
use patrika_scrape::{
  config::{ScrapeConfig, expand_tilde},
  fetch::{Fetcher, ReqwestTransport},
  job::{self, Job, JobStats, LinkOutcome, Scraper},
  pacing::RateLimiter,
  site::Site,
  snapshot::SnapshotStore,
};
use patrika_store_sqlite::SqliteStore;
use strum::IntoEnumIterator as _;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Nepal Kanun Patrika case scraper")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "patrika.toml")]
  config: PathBuf,

  /// Case type by Nepali name or number (1-7). Repeat for several jobs.
  #[arg(short = 't', long = "case-type", value_name = "TYPE")]
  case_types: Vec<CaseType>,

  /// Publication year (B.S.), in Devanagari or ASCII digits.
  #[arg(short, long, value_parser = numerals::parse_year)]
  year: Option<i32>,

  /// SQLite database path (overrides the config file).
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Snapshot directory (overrides the config file).
  #[arg(long, value_name = "DIR")]
  snapshots: Option<PathBuf>,

  /// Serve pages from saved snapshots where available.
  #[arg(long)]
  use_saved: bool,

  /// Skip links already stored as cases.
  #[arg(long)]
  skip_existing: bool,

  /// Fetch, parse and store a single detail page.
  #[arg(long, value_name = "URL", conflicts_with_all = ["test_saved", "retry_failed"])]
  test_link: Option<String>,

  /// Re-parse saved detail pages without touching the network.
  #[arg(long, conflicts_with = "retry_failed")]
  test_saved: bool,

  /// Maximum number of saved pages to re-parse.
  #[arg(long, requires = "test_saved")]
  limit: Option<usize>,

  /// Re-attempt every recorded failed link.
  #[arg(long)]
  retry_failed: bool,

  /// Print the accepted case types and exit.
  #[arg(long)]
  list_case_types: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.list_case_types {
    for case_type in CaseType::iter() {
      println!("{} {}", case_type.number(), case_type.name());
    }
    return Ok(());
  }

  // Validate the scrape request before opening anything.
  let scraping = cli.test_link.is_none() && !cli.test_saved && !cli.retry_failed;
  if scraping {
    if cli.case_types.is_empty() {
      bail!("at least one --case-type is required");
    }
    let year = cli.year.context("--year is required")?;
    Layout::resolve(year)?;
  }

  // Load configuration; flags win over file and environment.
  let mut cfg = ScrapeConfig::load(&cli.config).context("failed to load configuration")?;
  if let Some(path) = &cli.store {
    cfg.store_path = path.clone();
  }
  if let Some(dir) = &cli.snapshots {
    cfg.snapshot_dir = dir.clone();
  }
  let store_path = expand_tilde(&cfg.store_path);
  let snapshot_dir = expand_tilde(&cfg.snapshot_dir);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;
  let snapshots = SnapshotStore::open(&snapshot_dir).await.with_context(|| {
    format!("failed to open snapshot directory {}", snapshot_dir.display())
  })?;
  let transport = ReqwestTransport::new(cfg.request_timeout(), &cfg.user_agent)
    .context("failed to build HTTP client")?;
  let site = Site::new(&cfg.base_url).context("invalid base_url")?;

  let fetcher = Fetcher::new(
    transport,
    snapshots,
    RateLimiter::new(cfg.pacing()),
    cfg.retry_policy(),
  );
  let scraper = Arc::new(Scraper::new(Arc::new(fetcher), Arc::new(store), site));

  // Ctrl-C finishes the link in flight, then stops every job.
  let stop = Arc::new(AtomicBool::new(false));
  {
    let stop = stop.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, stopping after the current link");
        stop.store(true, Ordering::Relaxed);
      }
    });
  }

  let case_type = cli.case_types.first().copied();

  if let Some(url) = &cli.test_link {
    let outcome = scraper
      .test_link(url, case_type, cli.year, cli.use_saved)
      .await?;
    match outcome {
      LinkOutcome::Persisted => println!("stored {url}"),
      LinkOutcome::Skipped => println!("skipped {url}"),
      LinkOutcome::Failed(reason) => println!("failed {url}: {reason}"),
    }
    return Ok(());
  }

  if cli.test_saved {
    let stats = scraper
      .reparse_saved(case_type, cli.year, cli.limit, &stop)
      .await?;
    println!("saved pages: {stats}");
    return Ok(());
  }

  if cli.retry_failed {
    let mut total = JobStats::default();
    if cli.case_types.is_empty() {
      total += scraper.retry_failures(None, cli.year, &stop).await?;
    } else {
      for &case_type in &cli.case_types {
        total += scraper
          .retry_failures(Some(case_type), cli.year, &stop)
          .await?;
      }
    }
    println!("retried: {total}");
    return Ok(());
  }

  // Scrape: one task per case type, sharing pacing and the store.
  let year = cli.year.context("--year is required")?;
  let mut handles = Vec::new();
  for &case_type in &cli.case_types {
    let job = Job {
      case_type,
      year,
      prefer_cache: cli.use_saved,
      skip_existing: cli.skip_existing,
    };
    handles.push((case_type, job::spawn(scraper.clone(), job, stop.clone())));
  }

  let mut total = JobStats::default();
  let mut aborted = 0;
  for (case_type, handle) in handles {
    match handle.await {
      Ok(Ok(stats)) => {
        println!("{case_type} {year}: {stats}");
        total += stats;
      }
      Ok(Err(e)) => {
        error!(%case_type, year, error = %e, "job aborted");
        aborted += 1;
      }
      Err(e) => {
        error!(%case_type, year, error = %e, "job panicked");
        aborted += 1;
      }
    }
  }

  if cli.case_types.len() > 1 {
    println!("total: {total}");
  }
  info!(stored = total.cases_persisted, failed = total.links_failed, "done");

  if aborted > 0 {
    bail!("{aborted} job(s) aborted");
  }
  Ok(())
}
