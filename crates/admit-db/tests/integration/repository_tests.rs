//! Integration tests for AdmissionRepository.
//!
//! These tests verify the repository layer against a real PostgreSQL
//! database. Each test runs in an isolated container.

use admit_core::models::{Season, Term};
use admit_core::traits::AdmissionStore;

use crate::integration::common::{sample_admission, setup_repo};

/// Test 1: A new record is stored with every field intact.
#[tokio::test]
async fn test_insert_new_record() {
    let (repo, pool, _container) = setup_repo().await;
    let record = sample_admission(42);

    let inserted = repo.insert_batch(&[record.clone()]).await.unwrap();
    assert_eq!(inserted, 1);

    let row: (i32, String, Option<f64>, Option<f64>, String) = sqlx::query_as(
        "SELECT result_number, term, gpa, gre_aw, us_or_international FROM admissions WHERE url = $1",
    )
    .bind(&record.url)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(row.0, 42);
    assert_eq!(row.1, "Fall 2025");
    assert_eq!(row.2, Some(3.9));
    assert_eq!(row.3, Some(4.5));
    assert_eq!(row.4, "International");
}

/// Test 2: Re-inserting the same batch writes nothing.
#[tokio::test]
async fn test_reinsert_is_idempotent() {
    let (repo, _pool, _container) = setup_repo().await;
    let batch = vec![sample_admission(1), sample_admission(2), sample_admission(3)];

    let first = repo.insert_batch(&batch).await.unwrap();
    let second = repo.insert_batch(&batch).await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 0);
    assert_eq!(repo.get_stats().await.unwrap().total_records, 3);
}

/// Test 3: A conflicting URL keeps the stored values.
#[tokio::test]
async fn test_conflict_keeps_original_values() {
    let (repo, pool, _container) = setup_repo().await;
    let original = sample_admission(42);
    repo.insert_batch(&[original.clone()]).await.unwrap();

    let mut changed = sample_admission(42);
    changed.university = Some("MIT".to_string());
    changed.gpa = Some(2.0);
    let inserted = repo.insert_batch(&[changed]).await.unwrap();

    assert_eq!(inserted, 0);
    let (university, gpa): (String, f64) =
        sqlx::query_as("SELECT university, gpa FROM admissions WHERE url = $1")
            .bind(&original.url)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(university, "Stanford University");
    assert_eq!(gpa, 3.9);
}

/// Test 4: A failing record is skipped and the rest of the batch lands.
#[tokio::test]
async fn test_partial_batch_failure() {
    let (repo, _pool, _container) = setup_repo().await;
    let mut broken = sample_admission(2);
    // PostgreSQL rejects NUL bytes in text values.
    broken.comments = Some("bad\0value".to_string());
    let batch = vec![sample_admission(1), broken, sample_admission(3)];

    let inserted = repo.insert_batch(&batch).await.unwrap();

    assert_eq!(inserted, 2);
    let urls = repo.existing_urls().await.unwrap();
    assert!(urls.contains(&sample_admission(1).url));
    assert!(!urls.contains(&sample_admission(2).url));
    assert!(urls.contains(&sample_admission(3).url));
}

/// Test 5: `ensure_schema` can run repeatedly.
#[tokio::test]
async fn test_ensure_schema_is_idempotent() {
    let (repo, _pool, _container) = setup_repo().await;
    repo.insert_batch(&[sample_admission(1)]).await.unwrap();

    repo.ensure_schema().await.expect("second run should succeed");

    assert_eq!(repo.get_stats().await.unwrap().total_records, 1);
}

/// Test 6: Resume queries reflect the stored records.
#[tokio::test]
async fn test_resume_queries() {
    let (repo, _pool, _container) = setup_repo().await;
    assert_eq!(repo.max_result_number().await.unwrap(), None);
    assert!(repo.existing_urls().await.unwrap().is_empty());

    repo.insert_batch(&[sample_admission(7), sample_admission(19), sample_admission(11)])
        .await
        .unwrap();

    assert_eq!(repo.max_result_number().await.unwrap(), Some(19));
    assert_eq!(repo.existing_urls().await.unwrap().len(), 3);
}

/// Test 7: Stats count records and distinct universities.
#[tokio::test]
async fn test_get_stats() {
    let (repo, _pool, _container) = setup_repo().await;
    let mut other = sample_admission(2);
    other.university = Some("MIT".to_string());
    other.date_added = chrono::NaiveDate::from_ymd_opt(2025, 2, 1);
    repo.insert_batch(&[sample_admission(1), other, sample_admission(3)])
        .await
        .unwrap();

    let stats = repo.get_stats().await.unwrap();

    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.distinct_universities, 2);
    assert_eq!(stats.max_result_number, Some(3));
    assert_eq!(stats.last_date_added, chrono::NaiveDate::from_ymd_opt(2025, 2, 1));
}

/// Test 8: Analysis ignores implausible scores and summarizes by term.
#[tokio::test]
async fn test_analysis_report() {
    let (repo, _pool, _container) = setup_repo().await;

    let accepted = sample_admission(1);
    let mut rejected = sample_admission(2);
    rejected.status = Some("Rejected".to_string());
    rejected.citizenship = Some("American".to_string());
    rejected.gpa = Some(3.1);
    // Out of range: excluded from the averages.
    rejected.gre_quant = Some(320.0);
    let mut spring = sample_admission(3);
    spring.term = Some(Term::new(Season::Spring, 2026));
    spring.citizenship = Some("American".to_string());
    spring.gpa = None;
    repo.insert_batch(&[accepted, rejected, spring]).await.unwrap();

    let report = AdmissionStore::analysis(&repo).await.unwrap();

    assert_eq!(report.total_records, 3);
    assert_eq!(report.international_percentage, 33.33);
    assert_eq!(report.averages.gpa, Some(3.5));
    assert_eq!(report.averages.gre, Some(167.0));

    let fall = report.term("Fall 2025").unwrap();
    assert_eq!(fall.applicants, 2);
    assert_eq!(fall.acceptance_rate, Some(50.0));
    assert_eq!(fall.accepted_avg_gpa, Some(3.9));
    let spring = report.term("Spring 2026").unwrap();
    assert_eq!(spring.acceptance_rate, Some(100.0));
    assert_eq!(spring.accepted_avg_gpa, None);

    let phd = &report.degree_acceptance[0];
    assert_eq!(phd.degree, "PhD");
    assert_eq!(phd.with_gpa, Some(0.0));
    assert_eq!(phd.without_gpa, Some(100.0));
}

/// Test 9: The health check succeeds against a live database.
#[tokio::test]
async fn test_health_check() {
    let (repo, _pool, _container) = setup_repo().await;
    assert!(repo.health_check().await.is_ok());
}

/// Test 10: Concurrent overlapping batches never store a URL twice.
#[tokio::test]
async fn test_concurrent_inserts_keep_urls_unique() {
    // Arrange: every task inserts the same 20 URLs, starting at a different offset
    let (repo, pool, _container) = setup_repo().await;
    const TASKS: usize = 8;
    const RECORDS: i32 = 20;

    // Act
    let mut handles = Vec::new();
    for task in 0..TASKS {
        let repo = repo.clone();
        let batch: Vec<_> = (0..RECORDS)
            .map(|i| sample_admission((i + task as i32 * 3) % RECORDS + 1))
            .collect();
        handles.push(tokio::spawn(async move { repo.insert_batch(&batch).await }));
    }

    let mut inserted = 0;
    for handle in handles {
        inserted += handle.await.unwrap().unwrap();
    }

    // Assert
    assert_eq!(inserted, RECORDS as u64);

    let duplicated: Vec<(String,)> =
        sqlx::query_as("SELECT url FROM admissions GROUP BY url HAVING COUNT(*) > 1")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert!(duplicated.is_empty(), "duplicated urls: {:?}", duplicated);
    assert_eq!(repo.get_stats().await.unwrap().total_records, RECORDS as i64);
}

/// Test 11: A batch where every record fails reports zero rows, not an error.
#[tokio::test]
async fn test_fully_failed_batch_reports_zero() {
    // Arrange
    let (repo, _pool, _container) = setup_repo().await;
    let batch: Vec<_> = (1..=3)
        .map(|n| {
            let mut record = sample_admission(n);
            record.comments = Some("bad\0value".to_string());
            record
        })
        .collect();

    // Act
    let inserted = repo.insert_batch(&batch).await.unwrap();

    // Assert
    assert_eq!(inserted, 0);
    assert!(repo.existing_urls().await.unwrap().is_empty());
}
