//! Gated entry points for pull and analysis refresh.
//!
//! [`IngestCoordinator`] pairs an [`IngestService`] with the process-wide
//! [`BusyGate`]. At most one pull or refresh runs at a time; a trigger that
//! arrives while another is running is rejected, not queued.

use std::sync::{Arc, RwLock};

use crate::gate::{BusyGate, GateOutcome, Operation};
use crate::models::AnalysisReport;
use crate::pipeline::IngestService;
use crate::progress::{ProgressReporter, TracingReporter};
use crate::stats::PullReport;
use crate::traits::{AdmissionStore, PageSource, Standardizer};
use crate::AppError;

pub struct IngestCoordinator<S, P, Z>
where
    S: AdmissionStore,
    P: PageSource,
    Z: Standardizer,
{
    service: IngestService<S, P, Z>,
    gate: BusyGate,
    latest: Arc<RwLock<Option<AnalysisReport>>>,
}

impl<S, P, Z> Clone for IngestCoordinator<S, P, Z>
where
    S: AdmissionStore,
    P: PageSource,
    Z: Standardizer,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            gate: self.gate.clone(),
            latest: Arc::clone(&self.latest),
        }
    }
}

impl<S, P, Z> IngestCoordinator<S, P, Z>
where
    S: AdmissionStore,
    P: PageSource,
    Z: Standardizer,
{
    pub fn new(service: IngestService<S, P, Z>) -> Self {
        Self::with_gate(service, BusyGate::new())
    }

    /// Creates a coordinator sharing an existing gate.
    pub fn with_gate(service: IngestService<S, P, Z>, gate: BusyGate) -> Self {
        Self {
            service,
            gate,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    pub fn gate(&self) -> &BusyGate {
        &self.gate
    }

    pub fn service(&self) -> &IngestService<S, P, Z> {
        &self.service
    }

    /// Runs a pull under the gate, logging progress through `tracing`.
    pub async fn start_pull(&self) -> GateOutcome<PullReport> {
        self.start_pull_with_progress(&TracingReporter).await
    }

    /// Runs a pull under the gate, then refreshes the cached analysis.
    ///
    /// A failed analysis refresh after a successful pull is logged; the pull
    /// still counts as completed.
    pub async fn start_pull_with_progress<R: ProgressReporter>(
        &self,
        reporter: &R,
    ) -> GateOutcome<PullReport> {
        self.gate
            .run(Operation::Pull, async {
                let report = self.service.pull_with_progress(reporter).await?;
                match self.service.refresh_analysis().await {
                    Ok(analysis) => self.store_analysis(analysis),
                    Err(e) => {
                        tracing::warn!(error = %e, "Analysis refresh after pull failed");
                    }
                }
                Ok::<_, AppError>(report)
            })
            .await
    }

    /// Recomputes the analysis under the gate and caches it.
    pub async fn start_refresh(&self) -> GateOutcome<AnalysisReport> {
        self.gate
            .run(Operation::AnalysisRefresh, async {
                let analysis = self.service.refresh_analysis().await?;
                self.store_analysis(analysis.clone());
                Ok::<_, AppError>(analysis)
            })
            .await
    }

    /// The most recently computed analysis, if any.
    pub fn latest_analysis(&self) -> Option<AnalysisReport> {
        self.latest.read().ok().and_then(|guard| guard.clone())
    }

    fn store_analysis(&self, analysis: AnalysisReport) {
        if let Ok(mut guard) = self.latest.write() {
            *guard = Some(analysis);
        }
    }
}
