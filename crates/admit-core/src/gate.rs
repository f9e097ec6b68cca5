//! Process-wide busy gate serializing pull and analysis-refresh operations.
//!
//! The gate is non-queuing: a second caller is rejected immediately instead
//! of waiting. The holder is a single atomic byte (0 when free), taken with
//! one compare-and-swap and released by [`BusyGuard`]'s `Drop`, so it clears
//! on success, error, panic, or when the owning future is dropped.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::AppError;

/// Operations guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Pull,
    AnalysisRefresh,
}

impl Operation {
    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Pull => "pull",
            Operation::AnalysisRefresh => "analysis_refresh",
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Operation::Pull => 1,
            Operation::AnalysisRefresh => 2,
        }
    }

    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Operation::Pull),
            2 => Some(Operation::AnalysisRefresh),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Pull => write!(f, "pull"),
            Operation::AnalysisRefresh => write!(f, "analysis refresh"),
        }
    }
}

/// Result of running an operation through the gate.
#[derive(Debug)]
pub enum GateOutcome<T> {
    Completed(T),
    Failed(AppError),
    /// Another operation held the gate; nothing was run.
    RejectedBusy { holder: Option<Operation> },
}

impl<T> GateOutcome<T> {
    pub fn is_busy(&self) -> bool {
        matches!(self, GateOutcome::RejectedBusy { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, GateOutcome::Completed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GateOutcome<U> {
        match self {
            GateOutcome::Completed(value) => GateOutcome::Completed(f(value)),
            GateOutcome::Failed(e) => GateOutcome::Failed(e),
            GateOutcome::RejectedBusy { holder } => GateOutcome::RejectedBusy { holder },
        }
    }
}

/// The running operation's code, or 0 when free.
#[derive(Debug, Default)]
struct GateState {
    holder: AtomicU8,
}

/// Shared busy flag. Cloning shares the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct BusyGate {
    state: Arc<GateState>,
}

/// Holds the gate until dropped.
#[derive(Debug)]
pub struct BusyGuard {
    state: Arc<GateState>,
    operation: Operation,
}

impl BusyGuard {
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.holder.store(0, Ordering::Release);
        tracing::debug!(operation = %self.operation, "Busy gate released");
    }
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to take the gate for `operation`.
    ///
    /// Returns `None` immediately if any operation already holds it.
    pub fn try_acquire(&self, operation: Operation) -> Option<BusyGuard> {
        self.acquire(operation).ok()
    }

    /// Takes the gate, or reports the operation that held it at the moment
    /// of the attempt.
    fn acquire(&self, operation: Operation) -> Result<BusyGuard, Option<Operation>> {
        self.state
            .holder
            .compare_exchange(0, operation.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map_err(Operation::from_u8)?;
        tracing::debug!(operation = %operation, "Busy gate acquired");
        Ok(BusyGuard {
            state: Arc::clone(&self.state),
            operation,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.state.holder.load(Ordering::Acquire) != 0
    }

    /// The operation currently holding the gate, if any.
    pub fn holder(&self) -> Option<Operation> {
        Operation::from_u8(self.state.holder.load(Ordering::Acquire))
    }

    /// Runs `fut` while holding the gate.
    ///
    /// The future is not polled at all when the gate is busy.
    pub async fn run<T, Fut>(&self, operation: Operation, fut: Fut) -> GateOutcome<T>
    where
        Fut: Future<Output = Result<T, AppError>>,
    {
        let _guard = match self.acquire(operation) {
            Ok(guard) => guard,
            Err(holder) => {
                tracing::info!(
                    operation = %operation,
                    holder = ?holder,
                    "Rejected: another operation is in progress"
                );
                return GateOutcome::RejectedBusy { holder };
            }
        };

        match fut.await {
            Ok(value) => GateOutcome::Completed(value),
            Err(e) => GateOutcome::Failed(e),
        }
    }
}
