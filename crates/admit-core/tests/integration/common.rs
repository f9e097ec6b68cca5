//! Test utilities and mock implementations for integration tests.
//!
//! Provides in-memory implementations of the core traits for testing
//! `IngestService` and `IngestCoordinator` in isolation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use admit_core::models::{
    Admission, AnalysisReport, CanonicalNames, DetailFields, NamePair, StoreStats, SummaryRow,
};
use admit_core::traits::{AdmissionStore, PageSource, Standardizer};
use admit_core::{AppError, ScrapeConfig};
use tokio::sync::Notify;

pub const BASE_URL: &str = "https://gradcafe.test";

/// Config pointing at [`BASE_URL`] with a small page count.
pub fn test_config(num_pages: u32) -> ScrapeConfig {
    ScrapeConfig::default()
        .with_base_url(BASE_URL)
        .with_num_pages(num_pages)
        .with_concurrency(2)
}

pub fn result_url(n: i32) -> String {
    format!("{}/result/{}", BASE_URL, n)
}

/// A summary row linking to `/result/<n>`.
pub fn summary_row(n: i32, term: &str) -> SummaryRow {
    SummaryRow {
        href: Some(format!("/result/{}", n)),
        cells: vec![
            "Stanford University".to_string(),
            "Computer Science PhD".to_string(),
            "January 5, 2025".to_string(),
            "Accepted".to_string(),
            String::new(),
            format!("\n\t{}\n\tInternational", term),
        ],
    }
}

pub fn detail(university: &str, program: &str, gpa: &str) -> DetailFields {
    DetailFields {
        university: Some(university.to_string()),
        program: Some(program.to_string()),
        degree: Some("PhD".to_string()),
        citizenship: Some("International".to_string()),
        status: Some("Accepted".to_string()),
        status_date: Some("15/02/2025".to_string()),
        gpa: Some(gpa.to_string()),
        gre_quant: Some("0".to_string()),
        gre_verbal: Some("160".to_string()),
        gre_aw: Some("0.00".to_string()),
        comments: Some(String::new()),
    }
}

// =============================================================================
// MockPageSource
// =============================================================================

#[derive(Default)]
struct Blocking {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

/// In-memory listing site.
///
/// Records every URL it is asked for. Pages and details not configured
/// return a client error, as would a 404.
#[derive(Clone, Default)]
pub struct MockPageSource {
    pages: Arc<HashMap<u32, Vec<SummaryRow>>>,
    details: Arc<HashMap<String, DetailFields>>,
    failing: Arc<HashSet<String>>,
    requested: Arc<Mutex<Vec<String>>>,
    blocking: Option<Arc<Blocking>>,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, rows: Vec<SummaryRow>) -> Self {
        Arc::make_mut(&mut self.pages).insert(page, rows);
        self
    }

    pub fn with_detail(mut self, n: i32, fields: DetailFields) -> Self {
        Arc::make_mut(&mut self.details).insert(result_url(n), fields);
        self
    }

    /// Makes any request for `url` fail with a transient error.
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.failing).insert(url.into());
        self
    }

    /// Makes summary fetches wait for `release` after signalling `started`.
    pub fn blocking(mut self) -> (Self, Arc<Notify>, Arc<Notify>) {
        let blocking = Arc::new(Blocking::default());
        let started = Arc::clone(&blocking.started);
        let release = Arc::clone(&blocking.release);
        self.blocking = Some(blocking);
        (self, started, release)
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn was_requested(&self, fragment: &str) -> bool {
        self.requested_urls().iter().any(|url| url.contains(fragment))
    }

    fn record(&self, url: &str) -> Result<(), AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return Err(AppError::ClientError(format!("HTTP 503 for {}", url)));
        }
        Ok(())
    }
}

impl PageSource for MockPageSource {
    async fn fetch_summary_page(&self, page: u32, url: &str) -> Result<Vec<SummaryRow>, AppError> {
        self.record(url)?;
        if let Some(blocking) = &self.blocking {
            blocking.started.notify_one();
            blocking.release.notified().await;
        }
        self.pages
            .get(&page)
            .cloned()
            .ok_or_else(|| AppError::ClientError(format!("HTTP 404 for page {}", page)))
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<DetailFields, AppError> {
        self.record(url)?;
        self.details
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::ClientError(format!("HTTP 404 for {}", url)))
    }
}

// =============================================================================
// MockStore
// =============================================================================

/// In-memory admissions store keyed by URL.
#[derive(Clone, Default)]
pub struct MockStore {
    records: Arc<Mutex<HashMap<String, Admission>>>,
    fail_schema: bool,
    fail_resume: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `ensure_schema` always fails.
    pub fn failing_schema() -> Self {
        Self {
            fail_schema: true,
            ..Default::default()
        }
    }

    /// A store whose resume queries fail but which otherwise works.
    pub fn failing_resume() -> Self {
        Self {
            fail_resume: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn get(&self, url: &str) -> Option<Admission> {
        self.records.lock().unwrap().get(url).cloned()
    }

    pub fn insert(&self, record: Admission) {
        self.records
            .lock()
            .unwrap()
            .insert(record.url.clone(), record);
    }
}

impl AdmissionStore for MockStore {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        if self.fail_schema {
            return Err(AppError::Generic("schema unavailable".to_string()));
        }
        Ok(())
    }

    async fn insert_batch(&self, records: &[Admission]) -> Result<u64, AppError> {
        let mut stored = self.records.lock().unwrap();
        let mut inserted = 0;
        for record in records {
            if !stored.contains_key(&record.url) {
                stored.insert(record.url.clone(), record.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn max_result_number(&self) -> Result<Option<i32>, AppError> {
        if self.fail_resume {
            return Err(AppError::Generic("max query failed".to_string()));
        }
        let stored = self.records.lock().unwrap();
        Ok(stored.values().filter_map(|r| r.result_number).max())
    }

    async fn existing_urls(&self) -> Result<HashSet<String>, AppError> {
        if self.fail_resume {
            return Err(AppError::Generic("url query failed".to_string()));
        }
        Ok(self.records.lock().unwrap().keys().cloned().collect())
    }

    async fn analysis(&self) -> Result<AnalysisReport, AppError> {
        let mut report = AnalysisReport::empty();
        report.total_records = self.len() as i64;
        Ok(report)
    }

    async fn get_stats(&self) -> Result<StoreStats, AppError> {
        let stored = self.records.lock().unwrap();
        Ok(StoreStats {
            total_records: stored.len() as i64,
            distinct_universities: stored
                .values()
                .filter_map(|r| r.university.as_deref())
                .collect::<HashSet<_>>()
                .len() as i64,
            max_result_number: stored.values().filter_map(|r| r.result_number).max(),
            last_date_added: stored.values().filter_map(|r| r.date_added).max(),
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

// =============================================================================
// Standardizers
// =============================================================================

/// Standardizer that always fails.
#[derive(Clone, Default)]
pub struct FailingStandardizer;

impl Standardizer for FailingStandardizer {
    async fn standardize(&self, _pairs: &[NamePair]) -> Result<Vec<CanonicalNames>, AppError> {
        Err(AppError::StandardizerError("HTTP 503".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
