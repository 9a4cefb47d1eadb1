//! HTTP API Handlers and Routes
//!
//! The REST layer for Prashna, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! - `GET /api/health` - Liveness and index state
//! - `POST /api/ask` - Answer a question and translate the answer
//! - `GET /api/index` - Index statistics and the last build report
//! - `POST /api/index/rebuild` - Rebuild the index from the source directory
//!
//! Errors are returned as `{ "error": <message>, "kind": <category> }`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
