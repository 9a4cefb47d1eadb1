use crate::{AppState, types::HealthResponse};
use axum::{Json, extract::State};

/// Liveness plus whether the index is ready to answer questions.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let current = state.knowledge_base.current();
    Json(HealthResponse {
        status: "ok".to_string(),
        index_built: current.is_some(),
        entries: current.map(|index| index.entry_count()).unwrap_or(0),
    })
}
