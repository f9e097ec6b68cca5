//! Configuration types for admit components.
//!
//! Every struct has a `Default` matching production values and `with_*`
//! builders. The binaries fill them from clap arguments with environment
//! fallbacks.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::robots::RobotsPolicy;

/// Public listing site root.
pub const DEFAULT_BASE_URL: &str = "https://www.thegradcafe.com";

/// Summary pages walked by a full scrape (about 20 records per page).
pub const DEFAULT_NUM_PAGES: u32 = 2000;

/// Default database name when composing a connection URL from parts.
pub const DEFAULT_DB_NAME: &str = "grad_data";

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

impl DbConfig {
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }
}

/// Database location, resolved from `DATABASE_URL` or from its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConnection {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for DbConnection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: DEFAULT_DB_NAME.to_string(),
            user: None,
            password: None,
        }
    }
}

impl DbConnection {
    /// Returns `database_url` when set, otherwise a URL composed from the parts.
    pub fn resolve(&self, database_url: Option<&str>) -> String {
        match database_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => url.to_string(),
            None => self.to_url(),
        }
    }

    pub fn to_url(&self) -> String {
        let credentials = match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!("{}:{}@", user, password),
            (Some(user), None) => format!("{}@", user),
            _ => String::new(),
        };
        format!(
            "postgresql://{}{}:{}/{}",
            credentials, self.host, self.port, self.name
        )
    }
}

/// HTTP client configuration for outbound requests.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }
}

/// Where an incremental pull resumes relative to the highest stored result number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeBoundary {
    /// Only results strictly newer than the stored maximum.
    #[default]
    After,
    /// Results from the stored maximum onwards; the boundary record is re-fetched.
    From,
}

impl ResumeBoundary {
    /// Returns true if `result_number` is already covered by `max_known`.
    pub fn is_covered(self, result_number: i32, max_known: i32) -> bool {
        match self {
            ResumeBoundary::After => result_number <= max_known,
            ResumeBoundary::From => result_number < max_known,
        }
    }
}

impl fmt::Display for ResumeBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::After => write!(f, "after"),
            Self::From => write!(f, "from"),
        }
    }
}

impl FromStr for ResumeBoundary {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "after" => Ok(Self::After),
            "from" => Ok(Self::From),
            _ => Err(AppError::ConfigError(format!(
                "Unknown resume boundary: '{}'. Valid options: after, from",
                s
            ))),
        }
    }
}

/// Scrape and ingest configuration.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Listing site root; summary and detail URLs are built from it.
    pub base_url: String,
    /// Number of summary pages to walk, starting at page 1.
    pub num_pages: u32,
    /// Concurrent requests in the summary-page round.
    pub summary_concurrency: usize,
    /// Concurrent requests in the detail-page round.
    pub detail_concurrency: usize,
    /// Ignore stored URLs and result numbers and scrape everything.
    pub full_scan: bool,
    pub resume_boundary: ResumeBoundary,
    /// Records per standardizer call.
    pub standardize_batch_size: usize,
    /// JSONL file the cleaned records are appended to before loading.
    pub handoff_path: Option<PathBuf>,
    pub robots: RobotsPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            num_pages: DEFAULT_NUM_PAGES,
            summary_concurrency: 10,
            detail_concurrency: 10,
            full_scan: false,
            resume_boundary: ResumeBoundary::default(),
            standardize_batch_size: 32,
            handoff_path: None,
            robots: RobotsPolicy::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_num_pages(mut self, pages: u32) -> Self {
        self.num_pages = pages;
        self
    }

    /// Sets the same bound for both fetch rounds.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.summary_concurrency = concurrency.max(1);
        self.detail_concurrency = concurrency.max(1);
        self
    }

    pub fn with_full_scan(mut self) -> Self {
        self.full_scan = true;
        self
    }

    pub fn with_resume_boundary(mut self, boundary: ResumeBoundary) -> Self {
        self.resume_boundary = boundary;
        self
    }

    pub fn with_standardize_batch_size(mut self, size: usize) -> Self {
        self.standardize_batch_size = size.max(1);
        self
    }

    pub fn with_handoff_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.handoff_path = Some(path.into());
        self
    }

    pub fn with_robots(mut self, robots: RobotsPolicy) -> Self {
        self.robots = robots;
        self
    }

    /// URL of the given summary page.
    pub fn summary_url(&self, page: u32) -> String {
        format!("{}/survey/?page={}", self.base_url.trim_end_matches('/'), page)
    }

    /// Absolute URL for a link found in the summary table.
    pub fn detail_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if href.starts_with('/') {
            format!("{}{}", base, href)
        } else {
            format!("{}/{}", base, href)
        }
    }
}
