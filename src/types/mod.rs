use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub request_id: String,
    pub query: String,
    /// Answer in the source language (English)
    pub answer: String,
    pub translated_answer: String,
    pub target_language: String,
    /// False when the answer is the "no information available" response
    pub grounded: bool,
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Source {
    pub title: String,
    pub chunk_index: usize,
    pub relevance_score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub index_built: bool,
    pub entries: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStatusResponse {
    pub built: bool,
    pub collection: String,
    pub entries: usize,
    pub embedding_model: Option<String>,
    pub built_at: Option<DateTime<Utc>>,
    pub last_report: Option<IndexReport>,
}

// ============= Document Types =============

/// Raw text extracted from one file of the document source.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Path relative to the source directory
    pub source: PathBuf,
    pub text: String,
}

impl SourceDocument {
    /// Source identifier used in chunk metadata and ids: the relative path
    /// with `/` separators on every platform.
    pub fn source_id(&self) -> String {
        self.source
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// A bounded segment of a [`SourceDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Content hash of source, position and text
    pub id: String,
    pub text: String,
    pub source: String,
    pub index: usize,
}

// ============= Index Types =============

/// An entry stored in a vector store: chunk text, metadata and its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub source: String,
    pub chunk_index: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub entry: IndexEntry,
    pub score: f32,
}

impl SearchResult {
    pub fn to_source(&self) -> Source {
        Source {
            title: self.entry.metadata.source.clone(),
            chunk_index: self.entry.metadata.chunk_index,
            relevance_score: self.score,
        }
    }
}

/// Summary of one index build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexReport {
    pub collection: String,
    pub documents_loaded: usize,
    pub documents_skipped: usize,
    pub chunks_indexed: usize,
    pub duration_ms: u64,
}

// ============= QA Types =============

/// Chunks judged most similar to a query, best first.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub chunks: Vec<SearchResult>,
}

impl RetrievedContext {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn sources(&self) -> Vec<Source> {
        self.chunks.iter().map(SearchResult::to_source).collect()
    }
}

/// Generated answer in the source language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Source>,
    pub grounded: bool,
}

pub const NO_INFORMATION_ANSWER: &str =
    "No information is available: no documents have been indexed.";

impl Answer {
    /// The defined answer for queries against an empty index.
    pub fn no_information() -> Self {
        Self {
            text: NO_INFORMATION_ANSWER.to_string(),
            sources: Vec::new(),
            grounded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslatedAnswer {
    pub text: String,
    pub language: String,
}

/// Everything produced for one user query.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub request_id: String,
    pub query: String,
    pub answer: Answer,
    pub translation: TranslatedAnswer,
}

impl AskOutcome {
    pub fn into_response(self) -> AskResponse {
        AskResponse {
            request_id: self.request_id,
            query: self.query,
            answer: self.answer.text,
            translated_answer: self.translation.text,
            target_language: self.translation.language,
            grounded: self.answer.grounded,
            sources: self.answer.sources,
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("The index contains no documents")]
    EmptyIndex,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable error category.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Io(_) => "io",
            AppError::Service(_) => "service_unavailable",
            AppError::EmptyQuery | AppError::InvalidInput(_) => "invalid_input",
            AppError::EmptyIndex => "no_documents",
            AppError::NotFound(_) => "not_found",
            AppError::Configuration(_) | AppError::Internal(_) => "internal",
        }
    }

    /// Message shown to end users; distinguishes missing documents,
    /// unavailable services and bad input.
    pub fn user_message(&self) -> String {
        match self {
            AppError::EmptyQuery => "Invalid input: please enter a question.".to_string(),
            AppError::InvalidInput(msg) => format!("Invalid input: {}", msg),
            AppError::EmptyIndex => {
                "No documents indexed: add documents to the source directory and rebuild the index."
                    .to_string()
            }
            AppError::Service(_) => {
                "Service unavailable: the language or search service could not be reached. Please try again later."
                    .to_string()
            }
            AppError::Io(msg) => format!("Document source could not be read: {}", msg),
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::Configuration(_) | AppError::Internal(_) => {
                "Internal error: please check the server logs.".to_string()
            }
        }
    }

    /// Only service failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Service(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match self {
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Service(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EmptyQuery | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::EmptyIndex | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.user_message(),
            "kind": self.kind(),
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct_for_user_facing_cases() {
        assert_eq!(AppError::EmptyQuery.kind(), "invalid_input");
        assert_eq!(AppError::EmptyIndex.kind(), "no_documents");
        assert_eq!(AppError::Service("down".into()).kind(), "service_unavailable");
        assert_eq!(AppError::Io("denied".into()).kind(), "io");
    }

    #[test]
    fn test_user_messages() {
        assert!(AppError::EmptyIndex.user_message().starts_with("No documents indexed"));
        assert!(AppError::Service("quota".into())
            .user_message()
            .starts_with("Service unavailable"));
        assert!(AppError::EmptyQuery.user_message().starts_with("Invalid input"));
    }

    #[test]
    fn test_only_service_errors_retry() {
        assert!(AppError::Service("timeout".into()).is_retryable());
        assert!(!AppError::EmptyQuery.is_retryable());
        assert!(!AppError::Io("x".into()).is_retryable());
    }

    #[test]
    fn test_no_information_answer() {
        let answer = Answer::no_information();
        assert!(!answer.grounded);
        assert!(answer.sources.is_empty());
        assert_eq!(answer.text, NO_INFORMATION_ANSWER);
    }
}
