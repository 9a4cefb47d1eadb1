//! Index inspection and rebuild endpoints.

use crate::{
    AppState,
    types::{AppError, IndexReport, IndexStatusResponse, Result},
};
use axum::{Json, extract::State};

pub async fn index_status(State(state): State<AppState>) -> Json<IndexStatusResponse> {
    let kb = &state.knowledge_base;
    let current = kb.current();

    Json(IndexStatusResponse {
        built: current.is_some(),
        collection: kb.collection().to_string(),
        entries: current.as_ref().map(|index| index.entry_count()).unwrap_or(0),
        embedding_model: current
            .as_ref()
            .map(|index| index.embedding_model().to_string()),
        built_at: current.as_ref().map(|index| index.built_at()),
        last_report: kb.last_report(),
    })
}

/// Re-read the source directory and swap in a fresh index.
pub async fn rebuild_index(State(state): State<AppState>) -> Result<Json<IndexReport>> {
    let index = state.knowledge_base.rebuild().await?;
    tracing::info!(entries = index.entry_count(), "Index rebuilt via API");

    state
        .knowledge_base
        .last_report()
        .map(Json)
        .ok_or_else(|| AppError::Internal("Rebuild finished without a report".to_string()))
}
