//! Client for the remote name-standardization service.
//!
//! The service accepts `{"rows": [{"program": .., "university": ..}]}` at
//! `POST {endpoint}/standardize` and echoes each row back with
//! `llm-generated-program` and `llm-generated-university` added.

use admit_core::HttpConfig;
use admit_core::error::AppError;
use admit_core::models::{CanonicalNames, NamePair};
use admit_core::traits::Standardizer;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// HTTP client for the standardization service.
#[derive(Clone)]
pub struct StandardizerClient {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct StandardizeRequest<'a> {
    rows: &'a [NamePair],
}

#[derive(Deserialize)]
struct StandardizeResponse {
    rows: Vec<StandardizedRow>,
}

#[derive(Deserialize)]
struct StandardizedRow {
    #[serde(rename = "llm-generated-program", default)]
    program: Option<String>,
    #[serde(rename = "llm-generated-university", default)]
    university: Option<String>,
}

impl StandardizedRow {
    fn into_canonical(self) -> CanonicalNames {
        let non_empty = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        CanonicalNames {
            program: non_empty(self.program),
            university: non_empty(self.university),
        }
    }
}

impl StandardizerClient {
    /// Creates a client for the service at `endpoint` (e.g. `http://localhost:8000`).
    pub fn new(endpoint: &str) -> Result<Self, AppError> {
        Self::with_config(endpoint, HttpConfig::default())
    }

    pub fn with_config(endpoint: &str, http_config: HttpConfig) -> Result<Self, AppError> {
        reqwest::Url::parse(endpoint).map_err(|_| AppError::InvalidUrl(endpoint.to_string()))?;

        let client = Client::builder()
            .timeout(http_config.timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/standardize", endpoint.trim_end_matches('/')),
            timeout_secs: http_config.timeout.as_secs(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one batch and returns canonical names in input order.
    pub async fn standardize_batch(
        &self,
        pairs: &[NamePair],
    ) -> Result<Vec<CanonicalNames>, AppError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&StandardizeRequest { rows: pairs })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Cannot connect to standardizer: {}", e))
                } else {
                    AppError::StandardizerError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::StandardizerError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: StandardizeResponse = response.json().await.map_err(|e| {
            AppError::StandardizerError(format!("Failed to parse standardizer response: {}", e))
        })?;

        if body.rows.len() != pairs.len() {
            return Err(AppError::StandardizerError(format!(
                "Expected {} rows, got {}",
                pairs.len(),
                body.rows.len()
            )));
        }

        Ok(body
            .rows
            .into_iter()
            .map(StandardizedRow::into_canonical)
            .collect())
    }
}

impl Standardizer for StandardizerClient {
    async fn standardize(&self, pairs: &[NamePair]) -> Result<Vec<CanonicalNames>, AppError> {
        self.standardize_batch(pairs).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
