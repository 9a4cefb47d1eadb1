//! Indexing pipeline: load → chunk → embed → upsert.
//!
//! Embedding calls go through the retry policy; writes to the store are made
//! exactly once. Entry ids are content hashes, so running the pipeline twice
//! over an unchanged corpus leaves the store as it was. After the upserts,
//! entries whose ids no longer come from the corpus (removed or edited files)
//! are deleted, so the collection always mirrors the current documents.

use crate::db::vectorstore::VectorStore;
use crate::llm::RetryPolicy;
use crate::rag::chunker::{ChunkingStrategy, TextChunker};
use crate::rag::embeddings::Embedder;
use crate::rag::loader::DocumentLoader;
use crate::types::{
    AppError, Chunk, ChunkMetadata, IndexEntry, IndexReport, Result, SearchResult,
};
use crate::utils::toml_config::RagConfig;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Handle to a built collection.
///
/// Cheap to share behind an `Arc`; queries go straight to the store.
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    collection: String,
    entry_count: usize,
    embedding_model: String,
    built_at: DateTime<Utc>,
}

impl VectorIndex {
    pub fn new(
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        entry_count: usize,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            entry_count,
            embedding_model: embedding_model.into(),
            built_at: Utc::now(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Model whose vectors populate this index; queries must use the same one
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Top-`k` entries for a query embedding, best first.
    pub async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.store.search(&self.collection, embedding, k).await
    }
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("store", &self.store.provider_name())
            .field("collection", &self.collection)
            .field("entry_count", &self.entry_count)
            .field("embedding_model", &self.embedding_model)
            .field("built_at", &self.built_at)
            .finish()
    }
}

pub struct IndexingPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: TextChunker,
    glob: String,
    collection: String,
    batch_size: usize,
    clear_before_build: bool,
    retry: RetryPolicy,
}

impl IndexingPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        rag: &RagConfig,
        retry: RetryPolicy,
    ) -> Result<Self> {
        if rag.embedding_batch_size == 0 {
            return Err(AppError::InvalidInput(
                "embedding_batch_size must be at least 1".to_string(),
            ));
        }
        glob::Pattern::new(&rag.glob)
            .map_err(|e| AppError::InvalidInput(format!("Invalid glob '{}': {}", rag.glob, e)))?;

        Ok(Self {
            embedder,
            store,
            chunker: TextChunker::new(rag.chunk_size, rag.chunk_overlap, rag.chunking_strategy)?,
            glob: rag.glob.clone(),
            collection: rag.index_collection_name.clone(),
            batch_size: rag.embedding_batch_size,
            clear_before_build: rag.clear_before_build,
            retry,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn chunking_strategy(&self) -> ChunkingStrategy {
        self.chunker.strategy()
    }

    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    /// Build (or refresh) the collection from every matching file under
    /// `source_directory`.
    #[instrument(skip(self), fields(collection = %self.collection, directory = %source_directory.display()))]
    pub async fn build_index(&self, source_directory: &Path) -> Result<(VectorIndex, IndexReport)> {
        let started = Instant::now();

        let loader = DocumentLoader::new(source_directory, &self.glob)?;
        let loaded = loader.load().await?;

        let chunks: Vec<Chunk> = loaded
            .documents
            .iter()
            .flat_map(|doc| self.chunker.chunk_document(doc))
            .collect();

        info!(
            documents = loaded.documents.len(),
            skipped = loaded.skipped.len(),
            chunks = chunks.len(),
            "Loaded and chunked documents"
        );

        if self.clear_before_build {
            self.retry
                .run_once(
                    "vector_store.delete_collection",
                    self.store.delete_collection(&self.collection),
                )
                .await?;
            debug!("Cleared collection before build");
        }

        let indexed = self.embed_and_store(&chunks).await?;
        let pruned = self.prune_stale(&chunks).await?;
        let entry_count = indexed;

        let report = IndexReport {
            collection: self.collection.clone(),
            documents_loaded: loaded.documents.len(),
            documents_skipped: loaded.skipped.len(),
            chunks_indexed: indexed,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            entries = entry_count,
            chunks_indexed = indexed,
            pruned,
            duration_ms = report.duration_ms,
            "Index built"
        );

        let index = VectorIndex::new(
            self.store.clone(),
            self.collection.clone(),
            entry_count,
            self.embedder.model_name(),
        );

        Ok((index, report))
    }

    async fn embed_and_store(&self, chunks: &[Chunk]) -> Result<usize> {
        let mut collection_ready = false;
        let mut indexed = 0;
        let created_at = Utc::now();

        for (batch_no, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedder = &self.embedder;
            let texts_ref = texts.as_slice();
            let vectors = self
                .retry
                .run("embeddings.embed_batch", move || embedder.embed_batch(texts_ref))
                .await?;

            if vectors.len() != batch.len() {
                return Err(AppError::Service(format!(
                    "Embedding service returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }

            if !collection_ready {
                let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
                self.retry
                    .run_once(
                        "vector_store.create_collection",
                        self.store.create_collection(&self.collection, dimensions),
                    )
                    .await?;
                collection_ready = true;
            }

            let entries: Vec<IndexEntry> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, embedding)| IndexEntry {
                    id: chunk.id.clone(),
                    content: chunk.text.clone(),
                    metadata: ChunkMetadata {
                        source: chunk.source.clone(),
                        chunk_index: chunk.index,
                        created_at,
                    },
                    embedding: Some(embedding),
                })
                .collect();

            self.retry
                .run_once(
                    "vector_store.upsert",
                    self.store.upsert(&self.collection, &entries),
                )
                .await?;

            indexed += entries.len();
            debug!(batch = batch_no, entries = entries.len(), "Upserted batch");
        }

        Ok(indexed)
    }

    /// Delete every stored entry whose id is not among `chunks`.
    async fn prune_stale(&self, chunks: &[Chunk]) -> Result<usize> {
        let store = &self.store;
        let collection = self.collection.as_str();
        let stored = self
            .retry
            .run("vector_store.list_ids", move || store.list_ids(collection))
            .await?;

        let current: HashSet<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        let stale: Vec<String> = stored
            .into_iter()
            .filter(|id| !current.contains(id.as_str()))
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }

        self.retry
            .run_once(
                "vector_store.delete",
                self.store.delete(&self.collection, &stale),
            )
            .await?;
        debug!(entries = stale.len(), "Deleted entries no longer in the corpus");

        Ok(stale.len())
    }
}
