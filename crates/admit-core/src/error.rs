use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur while scraping,
/// normalizing and persisting admissions records. It uses the `thiserror`
/// crate for ergonomic error handling and automatic conversion from
/// underlying library errors.
///
/// # Error Conversion
///
/// Most errors automatically convert from their source types using the `#[from]` attribute:
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `serde_json::Error` → `AppError::SerializationError`
/// - `std::io::Error` → `AppError::IoError`
///
/// # Examples
///
/// ```no_run
/// use admit_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::Generic("Something went wrong".to_string()))
/// }
/// ```
///
/// A busy gate is not an error: rejected operations surface as
/// [`GateOutcome::RejectedBusy`](crate::gate::GateOutcome::RejectedBusy).
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed.
    ///
    /// This error wraps all errors from SQLx database operations, including
    /// connection failures, query errors, and constraint violations.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// HTTP client request failed.
    ///
    /// Covers non-success HTTP statuses and body decoding failures.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// JSON serialization or deserialization failed.
    ///
    /// Raised when reading or writing the JSONL hand-off file, or when the
    /// standardization service returns a malformed body.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The path is excluded by the robots policy and must not be fetched.
    ///
    /// This is a policy skip, never retried.
    #[error("Disallowed by robots policy: {0}")]
    Disallowed(String),

    /// HTML could not be processed (invalid selector or unexpected markup).
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The standardization service rejected or failed the request.
    #[error("Standardizer error: {0}")]
    StandardizerError(String),

    /// Network or connection error.
    ///
    /// This error occurs when a network request fails due to connectivity issues,
    /// DNS resolution failures, or the remote server being unreachable.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    ///
    /// This error occurs when a request takes longer than the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    ///
    /// This error occurs when too many requests are made in a short period.
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitExceeded,

    /// Configuration error.
    ///
    /// Raised for invalid settings such as a zero concurrency bound or an
    /// unparseable base URL.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A spawned operation panicked or was aborted before it produced a result.
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Generic application error for cases not covered by specific variants.
    ///
    /// Use this sparingly - prefer creating specific error variants
    /// for better error handling and debugging.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DatabaseError(e) => {
                if e.to_string().contains("connection") {
                    "Cannot connect to database. Is PostgreSQL running?\n   Check DATABASE_URL or the DB_HOST/DB_PORT/DB_NAME variables.".to_string()
                } else {
                    format!("Database error: {}", e)
                }
            }
            AppError::ClientError(msg) => {
                if msg.contains("timeout") || msg.contains("timed out") {
                    "Request timed out. The listing site may be slow or unreachable.\n   Try again later.".to_string()
                } else if msg.contains("connect") {
                    format!(
                        "Cannot connect to the listing site: {}\n   Check your internet connection.",
                        msg
                    )
                } else {
                    format!("API error: {}", msg)
                }
            }
            AppError::StandardizerError(msg) => {
                format!(
                    "Standardization service failed: {}\n   Records are kept with their scraped names.",
                    msg
                )
            }
            AppError::IoError(e) => {
                format!("File error: {}\n   Check the hand-off path and its permissions.", e)
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   The server may be overloaded. Try again later.",
                    secs
                )
            }
            AppError::RateLimitExceeded => {
                "Too many requests. Lower --concurrency and try again.".to_string()
            }
            AppError::ConfigError(msg) => {
                format!("Configuration error: {}\n   Check your flags and environment.", msg)
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use admit_core::error::AppError;
    ///
    /// let err = AppError::NetworkError("connection reset".to_string());
    /// assert!(err.is_retryable());
    ///
    /// // Robots-disallowed paths are never retried
    /// let err = AppError::Disallowed("/cgi-bin/x".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::RateLimitExceeded
                | AppError::ClientError(_)
        )
    }
}
