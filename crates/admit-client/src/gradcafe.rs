//! GradCafe client for fetching survey listings and result pages.
//!
//! # Examples
//!
//! ```no_run
//! use admit_client::GradCafeClient;
//! use admit_core::traits::PageSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GradCafeClient::new("https://www.thegradcafe.com")?;
//! let rows = client
//!     .fetch_summary_page(1, "https://www.thegradcafe.com/survey/?page=1")
//!     .await?;
//! println!("Found {} rows", rows.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use admit_core::error::AppError;
use admit_core::models::{DetailFields, SummaryRow};
use admit_core::traits::PageSource;
use admit_core::{HttpConfig, RobotsPolicy};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use tokio::time::sleep;

use crate::html;

/// Desktop browser identity sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// HTTP client for the GradCafe survey site.
///
/// Every request carries fixed browser headers. URLs matching the robots
/// policy are refused with [`AppError::Disallowed`] before any request is
/// made.
#[derive(Clone)]
pub struct GradCafeClient {
    client: Client,
    base_url: Url,
    http_config: HttpConfig,
    robots: RobotsPolicy,
}

impl GradCafeClient {
    /// Maximum backoff delay for rate-limited retries within `request_with_retry`.
    const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

    /// Maximum retries for rate-limited (429) responses.
    const RATE_LIMIT_MAX_RETRIES: u32 = 10;

    /// Creates a client for the site at `base_url_str` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the URL is malformed.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(base_url_str: &str) -> Result<Self, AppError> {
        Self::with_config(base_url_str, HttpConfig::default(), RobotsPolicy::default())
    }

    /// Creates a client with explicit HTTP settings and robots policy.
    pub fn with_config(
        base_url_str: &str,
        http_config: HttpConfig,
        robots: RobotsPolicy,
    ) -> Result<Self, AppError> {
        let base_url =
            Url::parse(base_url_str).map_err(|_| AppError::InvalidUrl(base_url_str.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(http_config.timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            http_config,
            robots,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches `url` as text after checking it against the robots policy.
    pub async fn fetch_html(&self, url: &str) -> Result<String, AppError> {
        let url = self.base_url.join(url).map_err(|_| AppError::InvalidUrl(url.to_string()))?;

        if self.robots.is_disallowed(url.as_str()) {
            return Err(AppError::Disallowed(url.to_string()));
        }

        let resp = self.request_with_retry(&url).await?;
        resp.text()
            .await
            .map_err(|e| AppError::ClientError(format!("Failed to read body of {}: {}", url, e)))
    }

    async fn request_with_retry(&self, url: &Url) -> Result<reqwest::Response, AppError> {
        let max_retries = self.http_config.max_retries.max(1);
        let base_delay = self.http_config.retry_base_delay;
        let mut last_error = AppError::Generic("No attempts made".to_string());
        let effective_max = Self::RATE_LIMIT_MAX_RETRIES.max(max_retries);

        for attempt in 1..=effective_max {
            match self.client.get(url.clone()).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        return Ok(resp);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = AppError::RateLimitExceeded;
                        if attempt < effective_max {
                            let retry_after = resp
                                .headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok());
                            let delay = Self::rate_limit_delay(retry_after, attempt, base_delay);
                            tracing::debug!(url = %url, attempt, ?delay, "Rate limited, backing off");
                            sleep(delay).await;
                            continue;
                        }
                        return Err(last_error);
                    }

                    if status.is_server_error() {
                        last_error = AppError::ClientError(format!(
                            "Server error: HTTP {} from {}",
                            status.as_u16(),
                            url
                        ));
                        if attempt < max_retries {
                            sleep(base_delay * attempt).await;
                            continue;
                        }
                        return Err(last_error);
                    }

                    return Err(AppError::ClientError(format!(
                        "HTTP {} from {}",
                        status.as_u16(),
                        url
                    )));
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = AppError::Timeout(self.http_config.timeout.as_secs());
                    } else if e.is_connect() {
                        last_error = AppError::NetworkError(format!("Connection failed: {}", e));
                    } else {
                        last_error = AppError::ClientError(e.to_string());
                    }

                    if attempt < max_retries && (e.is_timeout() || e.is_connect()) {
                        sleep(base_delay * attempt).await;
                        continue;
                    }
                    return Err(last_error);
                }
            }
        }

        Err(last_error)
    }

    /// Delay before retrying a 429, never longer than [`Self::MAX_RETRY_DELAY`].
    ///
    /// A numeric `Retry-After` wins over the exponential backoff.
    fn rate_limit_delay(retry_after: Option<&str>, attempt: u32, base_delay: Duration) -> Duration {
        retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| base_delay.saturating_mul(2_u32.saturating_pow(attempt)))
            .min(Self::MAX_RETRY_DELAY)
    }
}

impl PageSource for GradCafeClient {
    async fn fetch_summary_page(&self, page: u32, url: &str) -> Result<Vec<SummaryRow>, AppError> {
        let body = self.fetch_html(url).await?;
        let rows = html::parse_summary_table(&body)?;
        tracing::debug!(page, rows = rows.len(), "Parsed survey page");
        Ok(rows)
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<DetailFields, AppError> {
        let body = self.fetch_html(url).await?;
        html::parse_detail_list(&body)
    }
}
