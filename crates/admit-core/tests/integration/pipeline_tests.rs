//! Integration tests for IngestService.
//!
//! These tests drive the full pull pipeline against the in-memory listing
//! site and store from `common`.

use admit_core::models::{Admission, Season, Term};
use admit_core::{
    HeuristicStandardizer, DisabledStandardizer, IngestService, PullStatus, RobotsPolicy,
};

use crate::integration::common::{
    FailingStandardizer, MockPageSource, MockStore, detail, result_url, summary_row, test_config,
};

fn two_page_site() -> MockPageSource {
    MockPageSource::new()
        .with_page(1, vec![summary_row(103, "Fall 2025"), summary_row(102, "Fall 2025")])
        .with_page(2, vec![summary_row(101, "Spring 2026")])
        .with_detail(103, detail("stanford university", "computer science", "3.90"))
        .with_detail(102, detail("mcgill", "physics", "0.00"))
        .with_detail(101, detail("ubc", "history", "3.40"))
}

/// Test 1: A pull against an empty store inserts every record, normalized.
#[tokio::test]
async fn test_pull_inserts_normalized_records() {
    // Arrange
    let store = MockStore::new();
    let service = IngestService::with_config(
        store.clone(),
        two_page_site(),
        DisabledStandardizer,
        test_config(2),
    );

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.status, PullStatus::Updated);
    assert_eq!(report.scraped, 3);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.details_failed, 0);
    assert_eq!(store.len(), 3);

    let record = store.get(&result_url(102)).unwrap();
    assert_eq!(record.result_number, Some(102));
    assert_eq!(record.term, Some(Term::new(Season::Fall, 2025)));
    assert_eq!(record.university.as_deref(), Some("mcgill"));
    assert_eq!(record.gpa, None, "GPA 0.00 must be stored as absent");
    assert_eq!(record.gre_aw, None, "GRE AW 0.00 must be stored as absent");
    assert_eq!(record.gre_quant, None);
    assert_eq!(record.gre_verbal, Some(160.0));
    assert_eq!(record.comments, None);
    assert!(record.canonical_university.is_none());

    let spring = store.get(&result_url(101)).unwrap();
    assert_eq!(spring.term, Some(Term::new(Season::Spring, 2026)));
}

/// Test 2: A second pull over an unchanged site finds nothing new and
/// requests no detail pages.
#[tokio::test]
async fn test_second_pull_reports_no_new() {
    // Arrange
    let store = MockStore::new();
    let source = two_page_site();
    let service =
        IngestService::with_config(store.clone(), source.clone(), DisabledStandardizer, test_config(2));
    service.pull().await.unwrap();
    let requests_after_first = source.requested_urls().len();

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.status, PullStatus::NoNew);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.stats.skipped_existing, 3);
    // Only the two summary pages were fetched again.
    assert_eq!(source.requested_urls().len(), requests_after_first + 2);
    assert_eq!(store.len(), 3);
}

/// Test 3: Records at or below the stored maximum are skipped on resume.
#[tokio::test]
async fn test_resume_skips_older_results() {
    // Arrange
    let store = MockStore::new();
    store.insert(Admission::with_url(result_url(102)));
    let source = two_page_site();
    let service =
        IngestService::with_config(store.clone(), source.clone(), DisabledStandardizer, test_config(2));

    // Act
    let report = service.pull().await.unwrap();

    // Assert: 103 is newer, 102 exists, 101 is below the maximum
    assert_eq!(report.inserted, 1);
    assert_eq!(report.stats.skipped_existing, 2);
    assert!(source.was_requested("/result/103"));
    assert!(!source.was_requested("/result/101"));
}

/// Test 4: `full_scan` ignores the resume point; conflicts insert nothing.
#[tokio::test]
async fn test_full_scan_is_idempotent() {
    // Arrange
    let store = MockStore::new();
    let service = IngestService::with_config(
        store.clone(),
        two_page_site(),
        DisabledStandardizer,
        test_config(2).with_full_scan(),
    );
    service.pull().await.unwrap();

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.scraped, 3);
    assert_eq!(report.inserted, 0);
    assert_eq!(store.len(), 3);
}

/// Test 5: A failing summary page loses only that page.
#[tokio::test]
async fn test_failed_summary_page_is_skipped() {
    // Arrange
    let store = MockStore::new();
    let config = test_config(2);
    let source = two_page_site().failing(config.summary_url(1));
    let service = IngestService::with_config(store.clone(), source, DisabledStandardizer, config);

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.stats.pages_requested, 2);
    assert_eq!(report.stats.pages_fetched, 1);
    assert_eq!(report.inserted, 1);
    assert!(store.get(&result_url(101)).is_some());
}

/// Test 6: A failing detail page keeps the record with absent detail fields.
#[tokio::test]
async fn test_failed_detail_keeps_partial_record() {
    // Arrange
    let store = MockStore::new();
    let source = two_page_site().failing(result_url(103));
    let service =
        IngestService::with_config(store.clone(), source, DisabledStandardizer, test_config(2));

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.inserted, 3);
    assert_eq!(report.stats.details_failed, 1);
    let record = store.get(&result_url(103)).unwrap();
    assert_eq!(record.university, None);
    assert_eq!(record.gpa, None);
    assert_eq!(record.term, Some(Term::new(Season::Fall, 2025)));
    assert!(record.date_added.is_some());
}

/// Test 7: Disallowed paths are never requested.
#[tokio::test]
async fn test_robots_policy_is_respected() {
    // Arrange
    let mut blocked = summary_row(0, "Fall 2025");
    blocked.href = Some("/cgi-bin/result/55".to_string());
    let source = MockPageSource::new()
        .with_page(1, vec![blocked, summary_row(200, "Fall 2025")])
        .with_page(2, vec![summary_row(201, "Fall 2025")])
        .with_detail(200, detail("mit", "math", "3.5"))
        .with_detail(201, detail("mit", "math", "3.6"));
    let store = MockStore::new();
    let config = test_config(2).with_robots(RobotsPolicy::new(["/cgi-bin/", "page=2"]));
    let service = IngestService::with_config(store.clone(), source.clone(), DisabledStandardizer, config);

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert!(!source.was_requested("/cgi-bin/"));
    assert!(!source.was_requested("page=2"));
    assert_eq!(report.stats.pages_requested, 1);
    assert_eq!(report.stats.skipped_disallowed, 1);
    assert_eq!(report.inserted, 1);
    assert!(store.get(&result_url(200)).is_some());
}

/// Test 8: A schema failure aborts the pull before any request.
#[tokio::test]
async fn test_schema_failure_is_fatal() {
    // Arrange
    let source = two_page_site();
    let service = IngestService::with_config(
        MockStore::failing_schema(),
        source.clone(),
        DisabledStandardizer,
        test_config(2),
    );

    // Act
    let result = service.pull().await;

    // Assert
    assert!(result.is_err());
    assert!(source.requested_urls().is_empty());
}

/// Test 9: Resume query failures degrade to a full scan.
#[tokio::test]
async fn test_resume_failure_degrades() {
    // Arrange
    let store = MockStore::failing_resume();
    let service =
        IngestService::with_config(store.clone(), two_page_site(), DisabledStandardizer, test_config(2));

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.inserted, 3);
}

/// Test 10: The heuristic standardizer fills canonical names.
#[tokio::test]
async fn test_heuristic_standardization() {
    // Arrange
    let store = MockStore::new();
    let service = IngestService::with_config(
        store.clone(),
        two_page_site(),
        HeuristicStandardizer,
        test_config(2).with_standardize_batch_size(2),
    );

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.stats.standardized, 3);
    let record = store.get(&result_url(101)).unwrap();
    assert_eq!(
        record.canonical_university.as_deref(),
        Some("University of British Columbia")
    );
    assert_eq!(record.canonical_program.as_deref(), Some("History"));
    let record = store.get(&result_url(103)).unwrap();
    assert_eq!(record.canonical_university.as_deref(), Some("Stanford University"));
}

/// Test 11: A failing standardizer never blocks the load.
#[tokio::test]
async fn test_standardizer_failure_is_not_fatal() {
    // Arrange
    let store = MockStore::new();
    let service = IngestService::with_config(
        store.clone(),
        two_page_site(),
        FailingStandardizer,
        test_config(2),
    );

    // Act
    let report = service.pull().await.unwrap();

    // Assert
    assert_eq!(report.inserted, 3);
    assert_eq!(report.stats.standardized, 0);
    assert!(store.get(&result_url(103)).unwrap().canonical_program.is_none());
}

/// Test 12: The hand-off file round-trips into a fresh store.
#[tokio::test]
async fn test_handoff_written_and_loaded() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pull.jsonl");
    let store = MockStore::new();
    let service = IngestService::with_config(
        store.clone(),
        two_page_site(),
        DisabledStandardizer,
        test_config(2).with_handoff_path(&path),
    );
    service.pull().await.unwrap();

    let fresh = MockStore::new();
    let loader = IngestService::with_config(
        fresh.clone(),
        MockPageSource::new(),
        DisabledStandardizer,
        test_config(0),
    );

    // Act
    let inserted = loader.load_handoff(&path).await.unwrap();
    let again = loader.load_handoff(&path).await.unwrap();

    // Assert
    assert_eq!(inserted, 3);
    assert_eq!(again, 0);
    assert_eq!(fresh.get(&result_url(102)), store.get(&result_url(102)));
}

/// Test 13: `scrape_to_file` writes records without touching the store.
#[tokio::test]
async fn test_scrape_to_file_skips_store() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scrape.jsonl");
    let store = MockStore::failing_schema();
    let service = IngestService::with_config(
        store,
        two_page_site(),
        DisabledStandardizer,
        test_config(2),
    );

    // Act
    let report = service
        .scrape_to_file(&path, &admit_core::SilentReporter)
        .await
        .unwrap();

    // Assert
    assert_eq!(report.scraped, 3);
    assert_eq!(report.inserted, 0);
    let records = admit_core::handoff::read_records(&path).await.unwrap();
    assert_eq!(records.len(), 3);
}
