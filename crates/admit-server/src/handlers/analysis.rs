//! Analysis report endpoint.

use axum::{Json, extract::State};

use crate::dto::AnalysisResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Get the analysis report.
///
/// Returns the report cached by the last pull or refresh. Before the first
/// one, the report is computed directly from the store without taking the
/// busy gate.
#[utoipa::path(
    get,
    path = "/analysis",
    responses(
        (status = 200, description = "Analysis report", body = AnalysisResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analysis"
)]
pub async fn get_analysis(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let report = match state.coordinator.latest_analysis() {
        Some(report) => report,
        None => state.repo.analysis().await.map_err(ApiError::from)?,
    };

    Ok(Json(AnalysisResponse::from(report)))
}
