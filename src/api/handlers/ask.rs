//! Question answering endpoint.

use crate::{
    AppState,
    types::{AskRequest, AskResponse, Result},
};
use axum::{Json, extract::State};

/// Answer a question from the indexed documents and translate the answer.
///
/// Builds the index on first use if the server started without one.
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    if payload.query.trim().is_empty() {
        return Err(crate::types::AppError::EmptyQuery);
    }

    state.knowledge_base.ensure_built().await?;
    let outcome = state.assistant.ask(&payload.query).await?;

    tracing::info!(
        request_id = %outcome.request_id,
        grounded = outcome.answer.grounded,
        "Answered query"
    );

    Ok(Json(outcome.into_response()))
}
