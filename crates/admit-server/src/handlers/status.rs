//! Busy gate status endpoint.

use axum::{Json, extract::State};

use crate::dto::{GateStatusResponse, operation_name};
use crate::state::AppState;

/// Report whether a pull or analysis refresh is running.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Gate state", body = GateStatusResponse),
    ),
    tag = "system"
)]
pub async fn get_status(State(state): State<AppState>) -> Json<GateStatusResponse> {
    let gate = state.coordinator.gate();

    Json(GateStatusResponse {
        busy: gate.is_busy(),
        operation: operation_name(gate.holder()),
        shutting_down: state.is_shutting_down(),
    })
}
