//! Vector Store Abstraction Layer
//!
//! The indexing pipeline writes chunk embeddings through [`VectorStore`] and
//! the QA step reads them back, so the pipeline does not care whether vectors
//! live in process memory or in a hosted index.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     VectorStore Trait                     │
//! ├──────────────────────────────────────────────────────────┤
//! │ create_collection │ upsert │ list_ids │ delete │ search │
//! └──────────────────────────────────────────────────────────┘
//!            ▲                                 ▲
//!      ┌─────┴──────┐                   ┌──────┴─────┐
//!      │  InMemory  │                   │  Pinecone  │
//!      │ (default)  │                   │  (cloud)   │
//!      └────────────┘                   └────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use prashna::db::vectorstore::VectorStoreProvider;
//!
//! let store = VectorStoreProvider::from_config(&config.vector_store)?.create_store()?;
//! store.create_collection("marathichatbot", 1536).await?;
//! store.upsert("marathichatbot", &entries).await?;
//! let results = store.search("marathichatbot", &query_embedding, 4).await?;
//! ```

use crate::types::{AppError, IndexEntry, Result, SearchResult};
use crate::utils::toml_config::VectorStoreConfig;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Vector Store Provider Configuration
// ============================================================================

/// Vector store backend with resolved credentials.
#[derive(Debug, Clone)]
pub enum VectorStoreProvider {
    /// Process-local store. Contents are lost when the process exits.
    InMemory,

    /// Pinecone serverless or pod index, addressed by its data-plane host.
    ///
    /// Collections map to namespaces inside the index.
    Pinecone {
        api_key: String,
        index_host: String,
    },
}

impl VectorStoreProvider {
    pub fn from_config(config: &VectorStoreConfig) -> Result<Self> {
        match config {
            VectorStoreConfig::Memory => Ok(VectorStoreProvider::InMemory),
            VectorStoreConfig::Pinecone {
                api_key_env,
                index_host,
            } => {
                let api_key = std::env::var(api_key_env).map_err(|_| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;
                Ok(VectorStoreProvider::Pinecone {
                    api_key,
                    index_host: index_host.clone(),
                })
            }
        }
    }

    /// Create a vector store instance from this provider configuration.
    pub fn create_store(&self) -> Result<Arc<dyn VectorStore>> {
        match self {
            VectorStoreProvider::InMemory => Ok(Arc::new(InMemoryVectorStore::new())),
            VectorStoreProvider::Pinecone {
                api_key,
                index_host,
            } => Ok(Arc::new(super::pinecone::PineconeStore::new(
                api_key, index_host,
            )?)),
        }
    }
}

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Abstract trait for vector database operations.
///
/// # Implementors
///
/// - `InMemoryVectorStore` - process-local, cosine similarity
/// - `PineconeStore` - managed cloud service
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store provider.
    fn provider_name(&self) -> &'static str;

    /// Create a collection for vectors of the given dimension.
    ///
    /// Creating a collection that already exists is not an error.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a collection and all its entries. Deleting a missing collection
    /// is not an error.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Number of entries in a collection (0 if it does not exist).
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Upsert entries with their embeddings.
    ///
    /// Entries are identified by `id`; an existing entry with the same id is
    /// replaced. Every entry must carry an embedding.
    async fn upsert(&self, collection: &str, entries: &[IndexEntry]) -> Result<usize>;

    /// Ids of every entry in a collection (empty if it does not exist).
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>>;

    /// Delete entries by id. Ids that are not present are ignored.
    async fn delete(&self, collection: &str, ids: &[String]) -> Result<()>;

    /// Return up to `limit` entries most similar to `embedding`, sorted by
    /// score descending. Returned entries do not carry their embeddings.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;
}

// ============================================================================
// In-Memory Vector Store
// ============================================================================

/// In-memory vector store using cosine similarity.
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<String, InMemoryCollection>>>,
}

struct InMemoryCollection {
    dimensions: usize,
    entries: HashMap<String, IndexEntry>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Calculate cosine similarity between two vectors.
    pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write();
        match collections.get(name) {
            Some(existing) if existing.dimensions != dimensions => {
                Err(AppError::InvalidInput(format!(
                    "Collection '{}' already exists with dimension {} (requested {})",
                    name, existing.dimensions, dimensions
                )))
            }
            Some(_) => Ok(()),
            None => {
                collections.insert(
                    name.to_string(),
                    InMemoryCollection {
                        dimensions,
                        entries: HashMap::new(),
                    },
                );
                Ok(())
            }
        }
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().remove(name);
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().contains_key(name))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map(|col| col.entries.len())
            .unwrap_or(0))
    }

    async fn upsert(&self, collection: &str, entries: &[IndexEntry]) -> Result<usize> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' not found", collection)))?;

        for entry in entries {
            match &entry.embedding {
                None => {
                    return Err(AppError::InvalidInput(format!(
                        "Entry '{}' is missing embedding",
                        entry.id
                    )));
                }
                Some(embedding) if embedding.len() != col.dimensions => {
                    return Err(AppError::InvalidInput(format!(
                        "Entry '{}' has dimension {}, collection expects {}",
                        entry.id,
                        embedding.len(),
                        col.dimensions
                    )));
                }
                Some(_) => {}
            }
        }

        for entry in entries {
            col.entries.insert(entry.id.clone(), entry.clone());
        }

        Ok(entries.len())
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.collections.read();
        let mut ids: Vec<String> = collections
            .get(collection)
            .map(|col| col.entries.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        if let Some(col) = self.collections.write().get_mut(collection) {
            for id in ids {
                col.entries.remove(id);
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read();
        let Some(col) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut results: Vec<SearchResult> = col
            .entries
            .values()
            .filter_map(|entry| {
                let entry_embedding = entry.embedding.as_ref()?;
                Some(SearchResult {
                    entry: IndexEntry {
                        embedding: None,
                        ..entry.clone()
                    },
                    score: Self::cosine_similarity(embedding, entry_embedding),
                })
            })
            .collect();

        // Ties broken by id so equal scores come back in a stable order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
        results.truncate(limit);

        Ok(results)
    }
}

// ============================================================================
// Tests
// ============================================================================
