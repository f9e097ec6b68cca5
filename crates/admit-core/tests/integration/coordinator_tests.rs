//! Integration tests for IngestCoordinator and the busy gate.

use std::time::Duration;

use admit_core::{
    DisabledStandardizer, GateOutcome, IngestCoordinator, IngestService, Operation, PullStatus,
};

use crate::integration::common::{
    MockPageSource, MockStore, detail, summary_row, test_config,
};

fn one_page_site() -> MockPageSource {
    MockPageSource::new()
        .with_page(1, vec![summary_row(10, "Fall 2025"), summary_row(11, "Fall 2025")])
        .with_detail(10, detail("mit", "math", "3.7"))
        .with_detail(11, detail("mit", "physics", "3.8"))
}

fn coordinator(
    store: MockStore,
    source: MockPageSource,
) -> IngestCoordinator<MockStore, MockPageSource, DisabledStandardizer> {
    IngestCoordinator::new(IngestService::with_config(
        store,
        source,
        DisabledStandardizer,
        test_config(1),
    ))
}

/// Test 1: While a pull is in flight, a refresh is rejected as busy and
/// the pull still completes.
#[tokio::test]
async fn test_refresh_rejected_during_pull() {
    // Arrange
    let (source, started, release) = one_page_site().blocking();
    let store = MockStore::new();
    let coordinator = coordinator(store.clone(), source);

    let background = coordinator.clone();
    let pull = tokio::spawn(async move { background.start_pull().await });
    started.notified().await;

    // Act
    let refresh = coordinator.start_refresh().await;

    // Assert
    match refresh {
        GateOutcome::RejectedBusy { holder } => assert_eq!(holder, Some(Operation::Pull)),
        other => panic!("expected busy rejection, got {:?}", other),
    }
    assert_eq!(store.len(), 0, "Rejected refresh must not touch the store");

    release.notify_one();
    let outcome = pull.await.unwrap();
    match outcome {
        GateOutcome::Completed(report) => {
            assert_eq!(report.status, PullStatus::Updated);
            assert_eq!(report.inserted, 2);
        }
        other => panic!("expected completed pull, got {:?}", other),
    }
    assert!(!coordinator.gate().is_busy());
}

/// Test 2: A second pull while one is running is rejected; only one runs.
#[tokio::test]
async fn test_concurrent_pulls_admit_one() {
    // Arrange
    let (source, started, release) = one_page_site().blocking();
    let coordinator = coordinator(MockStore::new(), source.clone());

    let background = coordinator.clone();
    let first = tokio::spawn(async move { background.start_pull().await });
    started.notified().await;

    // Act
    let second = coordinator.start_pull().await;
    release.notify_one();
    let first = first.await.unwrap();

    // Assert
    assert!(second.is_busy());
    assert!(first.is_completed());
    // The rejected pull issued no requests of its own.
    assert_eq!(
        source
            .requested_urls()
            .iter()
            .filter(|url| url.contains("page=1"))
            .count(),
        1
    );
}

/// Test 3: A successful pull caches a fresh analysis report.
#[tokio::test]
async fn test_pull_refreshes_cached_analysis() {
    // Arrange
    let coordinator = coordinator(MockStore::new(), one_page_site());
    assert!(coordinator.latest_analysis().is_none());

    // Act
    let outcome = coordinator.start_pull().await;

    // Assert
    assert!(outcome.is_completed());
    let analysis = coordinator.latest_analysis().unwrap();
    assert_eq!(analysis.total_records, 2);
}

/// Test 4: A failing pull reports `Failed` and releases the gate.
#[tokio::test]
async fn test_failed_pull_releases_gate() {
    // Arrange
    let coordinator = coordinator(MockStore::failing_schema(), one_page_site());

    // Act
    let outcome = coordinator.start_pull().await;

    // Assert
    assert!(matches!(outcome, GateOutcome::Failed(_)));
    assert!(!coordinator.gate().is_busy());
    assert!(coordinator.start_refresh().await.is_completed());
}

/// Test 5: Refresh caches its report and later refreshes replace it.
#[tokio::test]
async fn test_refresh_updates_cache() {
    // Arrange
    let store = MockStore::new();
    let coordinator = coordinator(store.clone(), one_page_site());

    // Act
    let first = coordinator.start_refresh().await;
    coordinator.start_pull().await;
    let second = coordinator.start_refresh().await;

    // Assert
    match (first, second) {
        (GateOutcome::Completed(a), GateOutcome::Completed(b)) => {
            assert_eq!(a.total_records, 0);
            assert_eq!(b.total_records, 2);
        }
        other => panic!("expected two completed refreshes, got {:?}", other),
    }
    assert_eq!(coordinator.latest_analysis().unwrap().total_records, 2);
}

/// Test 6: A pull task aborted mid-flight still releases the gate.
#[tokio::test]
async fn test_aborted_pull_releases_gate() {
    // Arrange
    let (source, started, _release) = one_page_site().blocking();
    let coordinator = coordinator(MockStore::new(), source);

    let background = coordinator.clone();
    let pull = tokio::spawn(async move { background.start_pull().await });
    started.notified().await;
    assert!(coordinator.gate().is_busy());

    // Act
    pull.abort();
    let _ = pull.await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Assert
    assert!(!coordinator.gate().is_busy());
    assert!(coordinator.start_refresh().await.is_completed());
}
