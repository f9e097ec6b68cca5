//! Progress reporting for pulls.
//!
//! The pipeline emits [`PullEvent`]s through a [`ProgressReporter`] so that
//! the CLI and server can decide how (or whether) to surface them.

use tracing::info;

use crate::stats::PullReport;

/// Events emitted during a pull.
#[derive(Debug, Clone)]
pub enum PullEvent<'a> {
    /// The pull started with the given resume point.
    Started {
        full_scan: bool,
        max_known: Option<i32>,
        existing: usize,
    },
    /// The summary round finished.
    SummaryPagesFetched { fetched: usize, requested: usize },
    /// Records left after the resume and robots filters.
    RecordsDiscovered { new: usize, skipped: usize },
    /// The detail round finished.
    DetailsFetched { fetched: usize, failed: usize },
    /// A standardization chunk completed.
    Standardized { done: usize, total: usize },
    /// Records appended to the hand-off file.
    HandoffWritten { path: &'a str, records: usize },
    /// Records written to the store.
    Stored { inserted: u64, attempted: usize },
    Completed { report: &'a PullReport },
}

/// Receives pull events.
pub trait ProgressReporter: Send + Sync {
    /// Called when a pull event occurs.
    ///
    /// The default implementation does nothing (silent mode).
    fn report(&self, event: PullEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Reporter that logs events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: PullEvent<'_>) {
        match event {
            PullEvent::Started {
                full_scan,
                max_known,
                existing,
            } => {
                info!(full_scan, max_known = ?max_known, existing, "Pull started");
            }
            PullEvent::SummaryPagesFetched { fetched, requested } => {
                info!(fetched, requested, "Summary pages fetched");
            }
            PullEvent::RecordsDiscovered { new, skipped } => {
                info!(new, skipped, "Records discovered");
            }
            PullEvent::DetailsFetched { fetched, failed } => {
                info!(fetched, failed, "Detail pages fetched");
            }
            PullEvent::Standardized { done, total } => {
                tracing::debug!(done, total, "Standardization progress");
            }
            PullEvent::HandoffWritten { path, records } => {
                info!(path, records, "Hand-off file written");
            }
            PullEvent::Stored {
                inserted,
                attempted,
            } => {
                info!(inserted, attempted, "Records stored");
            }
            PullEvent::Completed { report } => {
                info!(
                    status = %report.status,
                    scraped = report.scraped,
                    inserted = report.inserted,
                    "Pull completed"
                );
            }
        }
    }
}
