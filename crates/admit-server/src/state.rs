use tokio_util::sync::CancellationToken;

use admit_client::{GradCafeClient, StandardizerEnum};
use admit_core::{IngestCoordinator, IngestService, ScrapeConfig};
use admit_db::AdmissionRepository;

/// The coordinator type wired with the production implementations.
pub type Coordinator = IngestCoordinator<AdmissionRepository, GradCafeClient, StandardizerEnum>;

/// Shared application state for all handlers.
///
/// Axum clones this per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Gated pull and analysis-refresh triggers
    pub coordinator: Coordinator,

    /// Repository for direct read-only queries
    pub repo: AdmissionRepository,

    /// Cancelled when the server starts shutting down
    pub shutdown_token: CancellationToken,
}

impl AppState {
    pub fn new(
        pool: sqlx::PgPool,
        client: GradCafeClient,
        standardizer: StandardizerEnum,
        config: ScrapeConfig,
        shutdown_token: CancellationToken,
    ) -> Self {
        let repo = AdmissionRepository::new(pool);
        let service = IngestService::with_config(repo.clone(), client, standardizer, config);

        Self {
            coordinator: IngestCoordinator::new(service),
            repo,
            shutdown_token,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }
}
