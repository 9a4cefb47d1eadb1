use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(crate::api::handlers::health::health))
        .route("/ask", post(crate::api::handlers::ask::ask))
        .route("/index", get(crate::api::handlers::index::index_status))
        .route(
            "/index/rebuild",
            post(crate::api::handlers::index::rebuild_index),
        )
}
