//! Standardizer selection and dynamic dispatch.
//!
//! The [`Standardizer`] trait uses `impl Future` return types (RPITIT),
//! which makes it not object-safe. [`StandardizerEnum`] provides runtime
//! selection between the remote service, the local heuristics, and no
//! standardization at all.
//!
//! # Usage
//!
//! ```no_run
//! use admit_client::provider::StandardizerEnum;
//! use admit_core::traits::Standardizer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let standardizer = StandardizerEnum::from_options(Some("http://localhost:8000"), false)?;
//! println!("Using {} standardizer", standardizer.name());
//! # Ok(())
//! # }
//! ```

use admit_core::error::AppError;
use admit_core::models::{CanonicalNames, NamePair};
use admit_core::traits::Standardizer;
use admit_core::{DisabledStandardizer, HeuristicStandardizer};

use crate::StandardizerClient;

/// Unified standardizer that wraps the concrete implementations.
#[derive(Clone)]
pub enum StandardizerEnum {
    /// Remote standardization service.
    Http(StandardizerClient),
    /// Local rule-based standardization.
    Heuristic(HeuristicStandardizer),
    /// Standardization turned off.
    Disabled(DisabledStandardizer),
}

impl StandardizerEnum {
    pub fn http(endpoint: &str) -> Result<Self, AppError> {
        Ok(Self::Http(StandardizerClient::new(endpoint)?))
    }

    pub fn heuristic() -> Self {
        Self::Heuristic(HeuristicStandardizer::new())
    }

    pub fn disabled() -> Self {
        Self::Disabled(DisabledStandardizer)
    }

    /// Picks a standardizer from configuration.
    ///
    /// A service endpoint wins over the heuristic flag; with neither,
    /// standardization is disabled.
    pub fn from_options(endpoint: Option<&str>, heuristic: bool) -> Result<Self, AppError> {
        match endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            Some(endpoint) => Self::http(endpoint),
            None if heuristic => Ok(Self::heuristic()),
            None => Ok(Self::disabled()),
        }
    }
}

impl Standardizer for StandardizerEnum {
    async fn standardize(&self, pairs: &[NamePair]) -> Result<Vec<CanonicalNames>, AppError> {
        match self {
            Self::Http(s) => s.standardize(pairs).await,
            Self::Heuristic(s) => s.standardize(pairs).await,
            Self::Disabled(s) => s.standardize(pairs).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Http(s) => s.name(),
            Self::Heuristic(s) => s.name(),
            Self::Disabled(s) => s.name(),
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            Self::Http(s) => s.is_enabled(),
            Self::Heuristic(s) => s.is_enabled(),
            Self::Disabled(s) => s.is_enabled(),
        }
    }
}
