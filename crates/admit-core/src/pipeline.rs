//! Ingest service: scrape, normalize, standardize and persist.
//!
//! # Architecture
//!
//! The [`IngestService`] is generic over three traits:
//! - [`AdmissionStore`] - for database operations
//! - [`PageSource`] - for fetching listing pages
//! - [`Standardizer`] - for canonical program/university names
//!
//! # Pull stages
//!
//! 1. Ensure the schema exists (fatal on failure)
//! 2. Load the resume point unless `full_scan` is set
//! 3. Fetch summary pages concurrently and assemble partial records
//! 4. Drop records already stored or excluded by the robots policy
//! 5. Fetch detail pages concurrently and merge them into the records
//! 6. Normalize, standardize, append to the hand-off file
//! 7. Insert with conflict-safe semantics
//!
//! Stages 3 and 5 are bounded separately by
//! [`ScrapeConfig::summary_concurrency`] and [`ScrapeConfig::detail_concurrency`].
//! A failed page fetch only loses that page; a failed detail fetch keeps
//! the record with its detail fields absent.

use std::collections::HashSet;
use std::path::Path;

use crate::assemble::{assemble, merge};
use crate::config::{ResumeBoundary, ScrapeConfig};
use crate::dispatch::{DetailTask, SummaryTask, run_concurrent};
use crate::handoff;
use crate::models::{Admission, AnalysisReport, PartialRecord};
use crate::normalize::clean;
use crate::progress::{ProgressReporter, PullEvent, SilentReporter};
use crate::stats::{PullReport, PullStats};
use crate::traits::{AdmissionStore, PageSource, Standardizer};
use crate::AppError;

/// What the store already holds, used to skip known records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumePoint {
    pub max_result_number: Option<i32>,
    pub existing_urls: HashSet<String>,
}

impl ResumePoint {
    /// A resume point that skips nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if the record is already covered by the store.
    pub fn is_known(&self, record: &PartialRecord, boundary: ResumeBoundary) -> bool {
        if self.existing_urls.contains(&record.url) {
            return true;
        }
        match (record.result_number, self.max_result_number) {
            (Some(n), Some(max)) => boundary.is_covered(n, max),
            _ => false,
        }
    }
}

/// Service running the scrape-and-ingest pipeline.
///
/// # Type Parameters
///
/// * `S` - Admission store implementation (e.g., `AdmissionRepository`)
/// * `P` - Page source implementation (e.g., `GradCafeClient`)
/// * `Z` - Standardizer implementation
///
/// # Example
///
/// ```ignore
/// use admit_core::pipeline::IngestService;
///
/// let service = IngestService::new(repo, gradcafe, HeuristicStandardizer);
/// let report = service.pull().await?;
/// println!("{}: {} inserted", report.status, report.inserted);
/// ```
pub struct IngestService<S, P, Z>
where
    S: AdmissionStore,
    P: PageSource,
    Z: Standardizer,
{
    store: S,
    source: P,
    standardizer: Z,
    config: ScrapeConfig,
}

impl<S, P, Z> Clone for IngestService<S, P, Z>
where
    S: AdmissionStore + Clone,
    P: PageSource + Clone,
    Z: Standardizer + Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            source: self.source.clone(),
            standardizer: self.standardizer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, P, Z> IngestService<S, P, Z>
where
    S: AdmissionStore,
    P: PageSource,
    Z: Standardizer,
{
    /// Creates a new ingest service with default configuration.
    pub fn new(store: S, source: P, standardizer: Z) -> Self {
        Self::with_config(store, source, standardizer, ScrapeConfig::default())
    }

    /// Creates an ingest service with custom configuration.
    pub fn with_config(store: S, source: P, standardizer: Z, config: ScrapeConfig) -> Self {
        Self {
            store,
            source,
            standardizer,
            config,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs a pull with no progress reporting.
    pub async fn pull(&self) -> Result<PullReport, AppError> {
        self.pull_with_progress(&SilentReporter).await
    }

    /// Runs a full pull, emitting progress events through `reporter`.
    ///
    /// # Errors
    ///
    /// Fails if the schema cannot be ensured. Inserts are tolerated per
    /// record: a failing row is skipped by the store, so `inserted` can be
    /// lower than `scraped`. Fetch, standardization and hand-off failures are
    /// logged and tolerated as well.
    pub async fn pull_with_progress<R: ProgressReporter>(
        &self,
        reporter: &R,
    ) -> Result<PullReport, AppError> {
        self.store.ensure_schema().await?;

        let resume = if self.config.full_scan {
            ResumePoint::none()
        } else {
            self.resume_point().await
        };
        reporter.report(PullEvent::Started {
            full_scan: self.config.full_scan,
            max_known: resume.max_result_number,
            existing: resume.existing_urls.len(),
        });

        let (mut records, mut stats) = self.scrape(&resume, reporter).await;
        if records.is_empty() {
            let report = PullReport::no_new(stats);
            reporter.report(PullEvent::Completed { report: &report });
            return Ok(report);
        }

        stats.standardized = self.standardize(&mut records, reporter).await;
        self.write_handoff(&records, reporter).await;

        let inserted = self.store.insert_batch(&records).await?;
        reporter.report(PullEvent::Stored {
            inserted,
            attempted: records.len(),
        });

        let report = PullReport::new(records.len(), inserted, stats);
        reporter.report(PullEvent::Completed { report: &report });
        Ok(report)
    }

    /// Scrapes without touching the store and appends the records to `path`.
    ///
    /// Every page is fetched; nothing is skipped as already known.
    pub async fn scrape_to_file<R: ProgressReporter>(
        &self,
        path: &Path,
        reporter: &R,
    ) -> Result<PullReport, AppError> {
        let (mut records, mut stats) = self.scrape(&ResumePoint::none(), reporter).await;
        stats.standardized = self.standardize(&mut records, reporter).await;

        let written = handoff::append_records(path, &records).await?;
        reporter.report(PullEvent::HandoffWritten {
            path: &path.display().to_string(),
            records: written,
        });

        let report = PullReport::new(records.len(), 0, stats);
        reporter.report(PullEvent::Completed { report: &report });
        Ok(report)
    }

    /// Loads a hand-off file into the store.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn load_handoff(&self, path: &Path) -> Result<u64, AppError> {
        self.store.ensure_schema().await?;
        let records = handoff::read_records(path).await?;
        if records.is_empty() {
            tracing::info!(path = %path.display(), "Hand-off file holds no records");
            return Ok(0);
        }
        let inserted = self.store.insert_batch(&records).await?;
        tracing::info!(
            path = %path.display(),
            read = records.len(),
            inserted,
            "Hand-off file loaded"
        );
        Ok(inserted)
    }

    /// Recomputes the aggregate analysis report.
    pub async fn refresh_analysis(&self) -> Result<AnalysisReport, AppError> {
        self.store.analysis().await
    }

    /// Reads the resume point from the store.
    ///
    /// A store error degrades to "no resume" with a warning; the insert
    /// conflict rule still prevents duplicates.
    pub async fn resume_point(&self) -> ResumePoint {
        let max_result_number = match self.store.max_result_number().await {
            Ok(max) => max,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read max result number, resuming from scratch");
                None
            }
        };
        let existing_urls = match self.store.existing_urls().await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read existing URLs, resuming from scratch");
                HashSet::new()
            }
        };
        ResumePoint {
            max_result_number,
            existing_urls,
        }
    }

    /// Runs both fetch rounds and returns normalized records.
    pub async fn scrape<R: ProgressReporter>(
        &self,
        resume: &ResumePoint,
        reporter: &R,
    ) -> (Vec<Admission>, PullStats) {
        let mut stats = PullStats::new();

        // Round 1: summary pages
        let summary_tasks: Vec<SummaryTask> = (1..=self.config.num_pages)
            .map(|page| SummaryTask {
                page,
                url: self.config.summary_url(page),
            })
            .filter(|task| {
                let allowed = self.config.robots.is_allowed(&task.url);
                if !allowed {
                    tracing::debug!(page = task.page, url = %task.url, "Summary page disallowed by robots policy");
                }
                allowed
            })
            .collect();
        stats.pages_requested = summary_tasks.len();

        let mut pages = run_concurrent(
            summary_tasks,
            |task| {
                let source = self.source.clone();
                async move {
                    let rows = source.fetch_summary_page(task.page, &task.url).await?;
                    Ok::<_, AppError>((task.page, rows))
                }
            },
            self.config.summary_concurrency,
        )
        .await;
        stats.pages_fetched = pages.len();
        reporter.report(PullEvent::SummaryPagesFetched {
            fetched: stats.pages_fetched,
            requested: stats.pages_requested,
        });

        // Page order keeps "first occurrence wins" deterministic.
        pages.sort_unstable_by_key(|(page, _)| *page);
        let rows = pages.into_iter().flat_map(|(_, rows)| rows).collect();
        let discovered = assemble(rows, &self.config);
        stats.discovered = discovered.len();

        let mut partials = Vec::with_capacity(discovered.len());
        for record in discovered {
            if resume.is_known(&record, self.config.resume_boundary) {
                stats.skipped_existing += 1;
            } else if self.config.robots.is_disallowed(&record.url) {
                tracing::debug!(url = %record.url, "Detail page disallowed by robots policy");
                stats.skipped_disallowed += 1;
            } else {
                partials.push(record);
            }
        }
        reporter.report(PullEvent::RecordsDiscovered {
            new: partials.len(),
            skipped: stats.skipped(),
        });

        if partials.is_empty() {
            return (Vec::new(), stats);
        }

        // Round 2: detail pages
        let detail_tasks: Vec<DetailTask> = partials
            .iter()
            .enumerate()
            .map(|(index, record)| DetailTask {
                index,
                url: record.url.clone(),
            })
            .collect();

        let details = run_concurrent(
            detail_tasks,
            |task| {
                let source = self.source.clone();
                async move {
                    let fields = source.fetch_detail_page(&task.url).await?;
                    Ok::<_, AppError>((task.index, fields))
                }
            },
            self.config.detail_concurrency,
        )
        .await;
        stats.details_fetched = details.len();
        stats.details_failed = partials.len() - details.len();
        reporter.report(PullEvent::DetailsFetched {
            fetched: stats.details_fetched,
            failed: stats.details_failed,
        });

        let records = merge(partials, details).into_iter().map(clean).collect();
        (records, stats)
    }

    /// Fills canonical names in chunks. Returns how many records received them.
    ///
    /// A failing or mis-sized chunk is logged and left without canonical names.
    pub async fn standardize<R: ProgressReporter>(
        &self,
        records: &mut [Admission],
        reporter: &R,
    ) -> usize {
        if !self.standardizer.is_enabled() || records.is_empty() {
            return 0;
        }

        let total = records.len();
        let mut done = 0;
        let mut standardized = 0;

        for chunk in records.chunks_mut(self.config.standardize_batch_size.max(1)) {
            let pairs: Vec<_> = chunk.iter().map(Admission::name_pair).collect();
            match self.standardizer.standardize(&pairs).await {
                Ok(names) if names.len() == chunk.len() => {
                    for (record, canonical) in chunk.iter_mut().zip(names) {
                        record.apply_canonical(canonical);
                    }
                    standardized += chunk.len();
                }
                Ok(names) => {
                    tracing::warn!(
                        standardizer = self.standardizer.name(),
                        expected = chunk.len(),
                        received = names.len(),
                        "Standardizer returned a mismatched batch, skipping"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        standardizer = self.standardizer.name(),
                        error = %e,
                        "Standardization failed for batch, skipping"
                    );
                }
            }
            done += chunk.len();
            reporter.report(PullEvent::Standardized { done, total });
        }

        standardized
    }

    async fn write_handoff<R: ProgressReporter>(&self, records: &[Admission], reporter: &R) {
        let Some(path) = self.config.handoff_path.as_deref() else {
            return;
        };
        match handoff::append_records(path, records).await {
            Ok(written) => reporter.report(PullEvent::HandoffWritten {
                path: &path.display().to_string(),
                records: written,
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to write hand-off file");
            }
        }
    }
}
