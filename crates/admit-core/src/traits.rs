//! Trait definitions for external dependencies.
//!
//! This module defines traits that abstract over the listing site, the
//! record store and the name standardizer, enabling:
//!
//! - **Testability**: Mock implementations for unit testing
//! - **Flexibility**: Different backends (HTTP standardizer vs. heuristics)
//! - **Decoupling**: The pipeline doesn't depend on reqwest or sqlx types
//!
//! # Example
//!
//! ```
//! use admit_core::traits::{AdmissionStore, PageSource};
//!
//! // Business logic uses traits, not concrete types
//! async fn first_page_rows<P: PageSource>(source: &P) -> usize {
//!     source
//!         .fetch_summary_page(1, "https://www.thegradcafe.com/survey/?page=1")
//!         .await
//!         .map(|rows| rows.len())
//!         .unwrap_or(0)
//! }
//! ```

use std::collections::HashSet;
use std::future::Future;

use crate::models::{Admission, AnalysisReport, CanonicalNames, DetailFields, NamePair, StoreStats, SummaryRow};
use crate::AppError;

/// Source of listing pages.
///
/// Implementations perform one request per call and return parsed, still
/// uncleaned, values. Parse misses yield empty values, not errors.
pub trait PageSource: Send + Sync + Clone {
    /// Fetches one summary page and returns its logical rows.
    ///
    /// # Arguments
    ///
    /// * `page` - The page number, used for log attribution
    /// * `url` - The absolute page URL
    fn fetch_summary_page(
        &self,
        page: u32,
        url: &str,
    ) -> impl Future<Output = Result<Vec<SummaryRow>, AppError>> + Send;

    /// Fetches one result's detail page.
    fn fetch_detail_page(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<DetailFields, AppError>> + Send;
}

/// Store for admissions records.
///
/// Records are write-once: a conflicting URL is ignored, never updated.
pub trait AdmissionStore: Send + Sync + Clone {
    /// Creates the table and its unique URL index if missing.
    fn ensure_schema(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Inserts each record unless its URL already exists.
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted.
    fn insert_batch(
        &self,
        records: &[Admission],
    ) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// Highest stored result number, or None for an empty store.
    fn max_result_number(&self) -> impl Future<Output = Result<Option<i32>, AppError>> + Send;

    /// Every stored source URL.
    fn existing_urls(&self) -> impl Future<Output = Result<HashSet<String>, AppError>> + Send;

    /// Runs the aggregate reporting queries.
    fn analysis(&self) -> impl Future<Output = Result<AnalysisReport, AppError>> + Send;

    fn get_stats(&self) -> impl Future<Output = Result<StoreStats, AppError>> + Send;

    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Maps scraped program/university names to canonical names.
pub trait Standardizer: Send + Sync + Clone {
    /// Returns exactly one result per input pair, in input order.
    fn standardize(
        &self,
        pairs: &[NamePair],
    ) -> impl Future<Output = Result<Vec<CanonicalNames>, AppError>> + Send;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Returns false if the pipeline should skip standardization entirely.
    fn is_enabled(&self) -> bool {
        true
    }
}
