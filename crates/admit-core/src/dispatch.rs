//! Bounded-concurrency dispatch of fetch tasks.
//!
//! Each round of the pipeline (summary pages, then detail pages) is a list of
//! independent tasks driven through [`run_concurrent`]. A failing task is
//! logged with its label and dropped; the round never fails as a whole.

use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::AppError;

/// A unit of work identified by a label for error attribution.
pub trait FetchTask: Send {
    fn label(&self) -> String;
}

/// Fetch one summary page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTask {
    pub page: u32,
    pub url: String,
}

impl FetchTask for SummaryTask {
    fn label(&self) -> String {
        format!("page {}", self.page)
    }
}

/// Fetch the detail page of the record at `index` in the partial record list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTask {
    pub index: usize,
    pub url: String,
}

impl FetchTask for DetailTask {
    fn label(&self) -> String {
        self.url.clone()
    }
}

/// Runs `worker` over every task with at most `max_concurrency` in flight.
///
/// Successful results are returned in completion order. Failed tasks are
/// logged at warn level and excluded. `max_concurrency` is clamped to at least 1.
pub async fn run_concurrent<T, R, W, Fut>(tasks: Vec<T>, worker: W, max_concurrency: usize) -> Vec<R>
where
    T: FetchTask,
    W: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, AppError>> + Send,
{
    let limit = max_concurrency.max(1);

    stream::iter(tasks)
        .map(|task| {
            let label = task.label();
            let fut = worker(task);
            async move {
                match fut.await {
                    Ok(value) => Some(value),
                    Err(AppError::Disallowed(path)) => {
                        tracing::debug!(task = %label, path = %path, "Skipped by robots policy");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(task = %label, error = %e, "Fetch task failed, skipping");
                        None
                    }
                }
            }
        })
        .buffer_unordered(limit)
        .filter_map(|result| async move { result })
        .collect()
        .await
}
