//! Pinecone vector database integration.
//!
//! Talks to the data-plane REST API of one index. Each collection is a
//! namespace inside that index, so `create_collection` has nothing to do on
//! the remote side: namespaces appear on first upsert.
//!
//! Chunk text and metadata are stored as vector metadata so search results
//! can be turned back into [`IndexEntry`] values without a second lookup.

use crate::db::vectorstore::VectorStore;
use crate::types::{AppError, ChunkMetadata, IndexEntry, Result, SearchResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    Client, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use tracing::debug;

/// Pinecone rejects upsert requests above 2MB; 100 vectors stays well under.
const UPSERT_BATCH: usize = 100;
/// Maximum ids per delete request.
const DELETE_BATCH: usize = 1000;
const LIST_PAGE_SIZE: &str = "100";

pub struct PineconeStore {
    client: Client,
    host: String,
}

impl PineconeStore {
    pub fn new(api_key: &str, index_host: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.trim())
                .map_err(|_| AppError::Configuration("Invalid Pinecone API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Pinecone-API-Version",
            HeaderValue::from_static("2024-07"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("Failed to build Pinecone HTTP client: {}", e))
            })?;

        let host = index_host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        Ok(Self { client, host })
    }

    async fn send<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.host, path);
        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Service(format!("Pinecone request to {} failed: {}", path, e)))
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let response = self.send(path, body).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response, path).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Service(format!("Invalid Pinecone response from {}: {}", path, e)))
    }

    /// Delete request where a missing namespace counts as success.
    async fn delete_request(&self, request: &DeleteRequest<'_>) -> Result<()> {
        let response = self.send("/vectors/delete", request).await?;
        let status = response.status();
        // A namespace that was never written does not exist yet
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(error_from_response(response, "/vectors/delete").await)
    }

    /// One page of `/vectors/list`; `None` when the namespace does not exist.
    async fn list_page(&self, namespace: &str, token: Option<&str>) -> Result<Option<ListResponse>> {
        let mut query = vec![("namespace", namespace), ("limit", LIST_PAGE_SIZE)];
        if let Some(token) = token {
            query.push(("paginationToken", token));
        }

        let response = self
            .client
            .get(format!("{}/vectors/list", self.host))
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Service(format!("Pinecone request to /vectors/list failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(error_from_response(response, "/vectors/list").await);
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| AppError::Service(format!("Invalid Pinecone response from /vectors/list: {}", e)))
    }

    async fn namespaces(&self) -> Result<HashMap<String, NamespaceSummary>> {
        let stats: IndexStats = self
            .post("/describe_index_stats", &serde_json::json!({}))
            .await?;
        Ok(stats.namespaces)
    }
}

async fn error_from_response(response: reqwest::Response, path: &str) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    map_status(status, path, &body)
}

fn map_status(status: StatusCode, path: &str, body: &str) -> AppError {
    let message = format!("Pinecone {} returned {}: {}", path, status, body);
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        AppError::Service(message)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AppError::Configuration(message)
    } else {
        AppError::InvalidInput(message)
    }
}

// ============= Wire types =============

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<PineconeVector<'a>>,
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
struct PineconeVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: VectorMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorMetadata {
    text: String,
    source: String,
    chunk_index: u64,
    created_at: String,
}

impl VectorMetadata {
    fn from_entry(entry: &IndexEntry) -> Self {
        Self {
            text: entry.content.clone(),
            source: entry.metadata.source.clone(),
            chunk_index: entry.metadata.chunk_index as u64,
            created_at: entry.metadata.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    metadata: Option<VectorMetadata>,
}

impl QueryMatch {
    fn into_result(self) -> SearchResult {
        let metadata = self.metadata.unwrap_or(VectorMetadata {
            text: String::new(),
            source: String::new(),
            chunk_index: 0,
            created_at: String::new(),
        });
        let created_at = DateTime::parse_from_rfc3339(&metadata.created_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        SearchResult {
            entry: IndexEntry {
                id: self.id,
                content: metadata.text,
                metadata: ChunkMetadata {
                    source: metadata.source,
                    chunk_index: metadata.chunk_index as usize,
                    created_at,
                },
                embedding: None,
            },
            score: self.score,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceSummary {
    #[serde(default)]
    vector_count: usize,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<&'a [String]>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    delete_all: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    vectors: Vec<ListedVector>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct ListedVector {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next: Option<String>,
}

#[async_trait]
impl VectorStore for PineconeStore {
    fn provider_name(&self) -> &'static str {
        "pinecone"
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        debug!(namespace = name, dimensions, "Pinecone namespaces are created on first upsert");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.delete_request(&DeleteRequest {
            delete_all: true,
            namespace: name,
            ..Default::default()
        })
        .await
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.namespaces().await?.contains_key(name))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self
            .namespaces()
            .await?
            .get(collection)
            .map(|ns| ns.vector_count)
            .unwrap_or(0))
    }

    async fn upsert(&self, collection: &str, entries: &[IndexEntry]) -> Result<usize> {
        let mut upserted = 0;

        for batch in entries.chunks(UPSERT_BATCH) {
            let vectors = batch
                .iter()
                .map(|entry| {
                    let values = entry.embedding.as_deref().ok_or_else(|| {
                        AppError::InvalidInput(format!("Entry '{}' is missing embedding", entry.id))
                    })?;
                    Ok(PineconeVector {
                        id: &entry.id,
                        values,
                        metadata: VectorMetadata::from_entry(entry),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let response: UpsertResponse = self
                .post(
                    "/vectors/upsert",
                    &UpsertRequest {
                        vectors,
                        namespace: collection,
                    },
                )
                .await?;
            upserted += response.upserted_count;
        }

        Ok(upserted)
    }

    /// Pages through `/vectors/list`, which serverless indexes support.
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let Some(page) = self.list_page(collection, token.as_deref()).await? else {
                break;
            };
            ids.extend(page.vectors.into_iter().map(|v| v.id));

            match page.pagination.and_then(|p| p.next) {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        Ok(ids)
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        for batch in ids.chunks(DELETE_BATCH) {
            self.delete_request(&DeleteRequest {
                ids: Some(batch),
                namespace: collection,
                ..Default::default()
            })
            .await?;
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let request = QueryRequest {
            vector: embedding,
            top_k: limit,
            include_metadata: true,
            include_values: false,
            namespace: collection,
        };
        let response: QueryResponse = self.post("/query", &request).await?;

        let mut results: Vec<SearchResult> = response
            .matches
            .into_iter()
            .map(QueryMatch::into_result)
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }
}
