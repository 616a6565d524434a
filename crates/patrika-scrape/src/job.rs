//! Per-job orchestration.
//!
//! A job is one (case type, year) pair. It walks the search results page by
//! page, fetches every detail link it has not seen, parses it with the era's
//! rules and persists the result. Links that fail get one more network
//! attempt at the end of the job and are recorded in the store only if that
//! fails too. A failing link never stops the job; only store or
//! snapshot-directory failures do.

use std::{
  collections::HashSet,
  fmt,
  ops::AddAssign,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use patrika_core::{
  case::{CaseType, NewCase, NewFailure},
  layout::Layout,
  store::CaseStore,
};
use patrika_parse::{Pagination, parse_listing};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  fetch::{FetchError, Fetcher, Transport},
  site::Site,
  snapshot::SnapshotKey,
};

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
  pub case_type:     CaseType,
  pub year:          i32,
  /// Serve pages from saved snapshots where one exists.
  pub prefer_cache:  bool,
  /// Do not revisit links already stored as cases.
  pub skip_existing: bool,
}

/// Counters reported at the end of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
  pub pages_visited:    u32,
  pub links_found:      u32,
  pub cases_persisted:  u32,
  pub links_failed:     u32,
  pub links_skipped:    u32,
  pub listing_failures: u32,
}

impl JobStats {
  fn record(&mut self, outcome: &LinkOutcome) {
    match outcome {
      LinkOutcome::Persisted => self.cases_persisted += 1,
      LinkOutcome::Skipped => self.links_skipped += 1,
      LinkOutcome::Failed(_) => self.links_failed += 1,
    }
  }
}

impl AddAssign for JobStats {
  fn add_assign(&mut self, rhs: Self) {
    self.pages_visited += rhs.pages_visited;
    self.links_found += rhs.links_found;
    self.cases_persisted += rhs.cases_persisted;
    self.links_failed += rhs.links_failed;
    self.links_skipped += rhs.links_skipped;
    self.listing_failures += rhs.listing_failures;
  }
}

impl fmt::Display for JobStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} pages, {} links, {} stored, {} failed, {} skipped",
      self.pages_visited,
      self.links_found,
      self.cases_persisted,
      self.links_failed,
      self.links_skipped,
    )?;
    if self.listing_failures > 0 {
      write!(f, ", listing stopped early")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
  Persisted,
  Skipped,
  Failed(String),
}

/// A fetch-parse-upsert attempt whose failure is not yet recorded.
enum Attempt {
  Stored,
  Failed(String),
}

// ─── Scraper ─────────────────────────────────────────────────────────────────

/// Runs jobs against one fetcher and one store. Cheap to share behind an
/// `Arc`; concurrent jobs serialise only on the fetcher's pacing.
pub struct Scraper<T, S> {
  fetcher: Arc<Fetcher<T>>,
  store:   Arc<S>,
  site:    Site,
}

impl<T: Transport, S: CaseStore> Scraper<T, S> {
  pub fn new(fetcher: Arc<Fetcher<T>>, store: Arc<S>, site: Site) -> Self {
    Self { fetcher, store, site }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn fetcher(&self) -> &Fetcher<T> { &self.fetcher }

  pub fn site(&self) -> &Site { &self.site }

  /// Run one job to completion, or until `stop` is raised. A stop is
  /// honoured between links, so the link in flight is always finished.
  pub async fn run(&self, job: &Job, stop: &AtomicBool) -> Result<JobStats> {
    let layout = Layout::resolve(job.year)?;
    info!(case_type = %job.case_type, year = job.year, %layout, "job started");

    let mut stats = JobStats::default();
    let mut seen = HashSet::new();
    let mut ceiling: Option<Pagination> = None;
    let mut url = self.site.search_url(job.case_type, job.year);
    let mut page = 1;
    let mut deferred = Vec::new();

    loop {
      if stop.load(Ordering::Relaxed) {
        info!(case_type = %job.case_type, year = job.year, "stop requested");
        break;
      }

      let key = SnapshotKey::listing(job.case_type, job.year, page);
      let fetched = match self.fetcher.fetch(&url, &key, job.prefer_cache).await {
        Ok(fetched) => fetched,
        Err(FetchError::Storage(e)) => return Err(e),
        Err(e) => {
          warn!(%url, page, error = %e, "listing page failed, ending pagination");
          stats.listing_failures += 1;
          break;
        }
      };
      stats.pages_visited += 1;

      let listing = parse_listing(&String::from_utf8_lossy(&fetched.body));
      if page == 1 {
        ceiling = listing.pagination.clone();
        if let Some(p) = &ceiling {
          debug!(pages = p.page_count(), "pagination found");
        }
      }
      if listing.detail_links.is_empty() {
        debug!(page, "listing page has no detail links");
        break;
      }

      let mut links = Vec::new();
      for href in &listing.detail_links {
        match self.site.resolve(href) {
          Ok(link) if seen.insert(link.clone()) => links.push(link),
          Ok(_) => {}
          Err(e) => warn!(%href, error = %e, "unusable detail link"),
        }
      }
      stats.links_found += links.len() as u32;

      for link in &links {
        if stop.load(Ordering::Relaxed) {
          break;
        }
        if self.already_stored(job, link).await? {
          stats.links_skipped += 1;
          continue;
        }
        let key = SnapshotKey::detail(job.case_type, job.year, link);
        match self.attempt(job, layout, link, &key).await? {
          Attempt::Stored => stats.cases_persisted += 1,
          Attempt::Failed(reason) => {
            debug!(url = %link, %reason, "link failed, deferring to the retry pass");
            deferred.push((link.clone(), reason));
          }
        }
      }

      page += 1;
      match ceiling.as_ref().and_then(|p| p.page_href(page)) {
        Some(href) => url = self.site.resolve(&href)?,
        None => break,
      }
    }

    // Links that failed get one more network attempt before being recorded.
    let retry = Job { prefer_cache: false, ..*job };
    for (link, reason) in deferred {
      let attempt = if stop.load(Ordering::Relaxed) {
        Attempt::Failed(reason)
      } else {
        let key = SnapshotKey::detail(job.case_type, job.year, &link);
        self.attempt(&retry, layout, &link, &key).await?
      };
      let outcome = self.settle(&retry, &link, attempt).await?;
      stats.record(&outcome);
    }

    info!(
      case_type = %job.case_type,
      year = job.year,
      pages = stats.pages_visited,
      stored = stats.cases_persisted,
      failed = stats.links_failed,
      skipped = stats.links_skipped,
      "job finished"
    );
    Ok(stats)
  }

  /// Fetch, parse and persist one detail link. Fetch and parse failures
  /// are recorded and reported as [`LinkOutcome::Failed`]; store failures
  /// are returned as errors.
  pub async fn process_link(
    &self,
    job: &Job,
    layout: Layout,
    url: &str,
  ) -> Result<LinkOutcome> {
    if self.already_stored(job, url).await? {
      return Ok(LinkOutcome::Skipped);
    }
    let key = SnapshotKey::detail(job.case_type, job.year, url);
    let attempt = self.attempt(job, layout, url, &key).await?;
    self.settle(job, url, attempt).await
  }

  async fn already_stored(&self, job: &Job, url: &str) -> Result<bool> {
    if !job.skip_existing {
      return Ok(false);
    }
    let stored = self.store.has_case(url).await.map_err(Error::store)?;
    if stored {
      debug!(url, "already stored, skipping");
    }
    Ok(stored)
  }

  /// Fetch, parse and upsert without recording a failure.
  async fn attempt(
    &self,
    job: &Job,
    layout: Layout,
    url: &str,
    key: &SnapshotKey,
  ) -> Result<Attempt> {
    let fetched = match self.fetcher.fetch(url, key, job.prefer_cache).await {
      Ok(fetched) => fetched,
      Err(FetchError::Storage(e)) => return Err(e),
      Err(e) => return Ok(Attempt::Failed(e.to_string())),
    };

    let page = String::from_utf8_lossy(&fetched.body);
    let parsed = match patrika_parse::parse(layout, &page, url) {
      Ok(parsed) => parsed,
      Err(e) => return Ok(Attempt::Failed(e.to_string())),
    };
    if let Some(edition) = parsed.edition_year
      && edition != job.year
    {
      debug!(url, edition, year = job.year, "page edition differs from job year");
    }

    self
      .store
      .upsert_case(NewCase {
        source_url:    url.to_owned(),
        case_type:     job.case_type,
        year:          job.year,
        snapshot_path: Some(fetched.snapshot_path.display().to_string()),
        fields:        parsed.fields,
      })
      .await
      .map_err(Error::store)?;
    info!(url, cached = fetched.from_cache, "case stored");
    Ok(Attempt::Stored)
  }

  /// Turn an attempt into an outcome, recording the failure if it failed.
  async fn settle(
    &self,
    job: &Job,
    url: &str,
    attempt: Attempt,
  ) -> Result<LinkOutcome> {
    let message = match attempt {
      Attempt::Stored => return Ok(LinkOutcome::Persisted),
      Attempt::Failed(message) => message,
    };
    let failure = self
      .store
      .record_failure(NewFailure {
        case_type:     job.case_type,
        year:          job.year,
        source_url:    url.to_owned(),
        error_message: message.clone(),
      })
      .await
      .map_err(Error::store)?;
    warn!(url, retries = failure.retry_count, error = %message, "link failed");
    Ok(LinkOutcome::Failed(message))
  }

  // ─── Maintenance modes ────────────────────────────────────────────────────

  /// Process a single link. Without an explicit case type and year, the
  /// origin is taken from the stored case for `url`.
  pub async fn test_link(
    &self,
    url: &str,
    case_type: Option<CaseType>,
    year: Option<i32>,
    prefer_cache: bool,
  ) -> Result<LinkOutcome> {
    let stored = match (case_type, year) {
      (Some(_), Some(_)) => None,
      _ => self.store.get_case(url).await.map_err(Error::store)?,
    };
    let (Some(case_type), Some(year)) = (
      case_type.or(stored.as_ref().map(|c| c.case_type)),
      year.or(stored.as_ref().map(|c| c.year)),
    ) else {
      return Err(Error::UnknownOrigin(url.to_owned()));
    };

    let layout = Layout::resolve(year)?;
    let job = Job { case_type, year, prefer_cache, skip_existing: false };
    self.process_link(&job, layout, url).await
  }

  /// Re-parse saved detail pages without touching the network.
  pub async fn reparse_saved(
    &self,
    case_type: Option<CaseType>,
    year: Option<i32>,
    limit: Option<usize>,
    stop: &AtomicBool,
  ) -> Result<JobStats> {
    let keys = self.fetcher.snapshots().list(case_type, year).await?;
    let mut stats = JobStats::default();

    for key in keys.into_iter().take(limit.unwrap_or(usize::MAX)) {
      if stop.load(Ordering::Relaxed) {
        break;
      }
      stats.links_found += 1;
      let layout = match Layout::resolve(key.year) {
        Ok(layout) => layout,
        Err(e) => {
          warn!(file = %key.file_name(), error = %e, "skipping snapshot");
          stats.links_skipped += 1;
          continue;
        }
      };
      // Only numbered snapshots map back to a real detail URL.
      if !key.sequence.bytes().all(|b| b.is_ascii_digit()) {
        warn!(file = %key.file_name(), "snapshot has no link number, skipping");
        stats.links_skipped += 1;
        continue;
      }
      let url = self.site.detail_url(&key.sequence)?;
      let job = Job {
        case_type:     key.case_type,
        year:          key.year,
        prefer_cache:  true,
        skip_existing: false,
      };
      let attempt = self.attempt(&job, layout, &url, &key).await?;
      let outcome = self.settle(&job, &url, attempt).await?;
      stats.record(&outcome);
    }

    info!(
      checked = stats.links_found,
      stored = stats.cases_persisted,
      failed = stats.links_failed,
      "saved pages re-parsed"
    );
    Ok(stats)
  }

  /// Re-attempt every recorded failure matching the filters. A success
  /// clears the failure; another failure bumps its retry count.
  pub async fn retry_failures(
    &self,
    case_type: Option<CaseType>,
    year: Option<i32>,
    stop: &AtomicBool,
  ) -> Result<JobStats> {
    let failures = self
      .store
      .list_failures(case_type, year)
      .await
      .map_err(Error::store)?;
    let mut stats = JobStats::default();

    for failure in failures {
      if stop.load(Ordering::Relaxed) {
        break;
      }
      stats.links_found += 1;
      let Ok(layout) = Layout::resolve(failure.year) else {
        stats.links_skipped += 1;
        continue;
      };
      let job = Job {
        case_type:     failure.case_type,
        year:          failure.year,
        prefer_cache:  false,
        skip_existing: false,
      };
      let outcome = self.process_link(&job, layout, &failure.source_url).await?;
      stats.record(&outcome);
    }
    Ok(stats)
  }
}

/// Run `job` on its own task.
pub fn spawn<T, S>(
  scraper: Arc<Scraper<T, S>>,
  job: Job,
  stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<Result<JobStats>>
where
  T: Transport + 'static,
  S: CaseStore + 'static,
{
  tokio::spawn(async move { scraper.run(&job, &stop).await })
}
