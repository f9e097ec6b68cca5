//! Gated pull and analysis-refresh triggers.
//!
//! Both operations run on a spawned task so a client that disconnects
//! mid-request does not abort the work half-way. The handler still waits
//! for the outcome and reports it.

use axum::{Json, extract::State, http::StatusCode};

use crate::dto::TriggerResponse;
use crate::state::AppState;

fn shutting_down() -> (StatusCode, Json<TriggerResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(TriggerResponse::failed("Server is shutting down")),
    )
}

fn task_failed(e: tokio::task::JoinError) -> (StatusCode, Json<TriggerResponse>) {
    tracing::error!(error = %e, "Gated task did not complete");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(TriggerResponse::failed(format!("Task failed: {}", e))),
    )
}

/// Scrape new results and load them into the store.
///
/// Rejected with 409 while another pull or refresh is running.
#[utoipa::path(
    post,
    path = "/pull-data",
    responses(
        (status = 200, description = "Pull completed", body = TriggerResponse),
        (status = 409, description = "Another operation is running", body = TriggerResponse),
        (status = 500, description = "Pull failed", body = TriggerResponse),
        (status = 503, description = "Server is shutting down", body = TriggerResponse),
    ),
    tag = "triggers"
)]
pub async fn pull_data(State(state): State<AppState>) -> (StatusCode, Json<TriggerResponse>) {
    if state.is_shutting_down() {
        return shutting_down();
    }

    let coordinator = state.coordinator.clone();
    match tokio::spawn(async move { coordinator.start_pull().await }).await {
        Ok(outcome) => {
            let (status, body) = TriggerResponse::from_pull(outcome);
            (status, Json(body))
        }
        Err(e) => task_failed(e),
    }
}

/// Recompute the analysis report.
///
/// Rejected with 409 while another pull or refresh is running.
#[utoipa::path(
    post,
    path = "/update-analysis",
    responses(
        (status = 200, description = "Analysis refreshed", body = TriggerResponse),
        (status = 409, description = "Another operation is running", body = TriggerResponse),
        (status = 500, description = "Refresh failed", body = TriggerResponse),
        (status = 503, description = "Server is shutting down", body = TriggerResponse),
    ),
    tag = "triggers"
)]
pub async fn update_analysis(
    State(state): State<AppState>,
) -> (StatusCode, Json<TriggerResponse>) {
    if state.is_shutting_down() {
        return shutting_down();
    }

    let coordinator = state.coordinator.clone();
    match tokio::spawn(async move { coordinator.start_refresh().await }).await {
        Ok(outcome) => {
            let (status, body) = TriggerResponse::from_refresh(outcome);
            (status, Json(body))
        }
        Err(e) => task_failed(e),
    }
}
