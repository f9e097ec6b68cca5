//! Pull statistics and reports.

use std::fmt;

use serde::Serialize;

/// Counters collected across the stages of a pull.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PullStats {
    /// Summary pages scheduled (after the robots filter).
    pub pages_requested: usize,
    /// Summary pages that returned successfully.
    pub pages_fetched: usize,
    /// Distinct linked records found on summary pages.
    pub discovered: usize,
    /// Records dropped because the store already has them.
    pub skipped_existing: usize,
    /// Records dropped by the robots policy.
    pub skipped_disallowed: usize,
    /// Detail pages that returned successfully.
    pub details_fetched: usize,
    /// Detail pages that failed; their records are kept with absent fields.
    pub details_failed: usize,
    /// Records that received canonical names.
    pub standardized: usize,
}

impl PullStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary pages that failed.
    pub fn pages_failed(&self) -> usize {
        self.pages_requested.saturating_sub(self.pages_fetched)
    }

    pub fn skipped(&self) -> usize {
        self.skipped_existing + self.skipped_disallowed
    }
}

/// Whether a pull found anything new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PullStatus {
    NoNew,
    Updated,
}

impl PullStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullStatus::NoNew => "no_new",
            PullStatus::Updated => "updated",
        }
    }
}

impl fmt::Display for PullStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullReport {
    pub status: PullStatus,
    /// Records scraped and normalized in this run.
    pub scraped: usize,
    /// Rows actually inserted; conflicting URLs are not counted.
    pub inserted: u64,
    pub stats: PullStats,
}

impl PullReport {
    pub fn new(scraped: usize, inserted: u64, stats: PullStats) -> Self {
        let status = if scraped == 0 {
            PullStatus::NoNew
        } else {
            PullStatus::Updated
        };
        Self {
            status,
            scraped,
            inserted,
            stats,
        }
    }

    pub fn no_new(stats: PullStats) -> Self {
        Self::new(0, 0, stats)
    }
}
