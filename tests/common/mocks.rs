//! Mock implementations for testing.
//!
//! Service doubles shared by the integration tests: a generation client that
//! records every prompt, a deterministic embedder and a vector store wrapper
//! that counts calls.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use prashna::db::vectorstore::{InMemoryVectorStore, VectorStore};
use prashna::llm::LLMClient;
use prashna::rag::embeddings::Embedder;
use prashna::types::{AppError, IndexEntry, Result, SearchResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One call made to [`MockLLMClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: Option<String>,
    pub prompt: String,
}

/// Mock LLM client with configurable responses.
///
/// Answering goes through `generate_with_system`, translation through
/// `generate`, so the two can be given different responses.
///
/// # Examples
///
/// ```ignore
/// let client = MockLLMClient::new("Paris", "पॅरिस");
/// let client = MockLLMClient::failing();
/// let client = MockLLMClient::new("Paris", "पॅरिस").fail_first(2);
/// ```
pub struct MockLLMClient {
    answer: String,
    translation: String,
    should_fail: bool,
    failures_left: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLLMClient {
    pub fn new(answer: &str, translation: &str) -> Self {
        Self {
            answer: answer.to_string(),
            translation: translation.to_string(),
            should_fail: false,
            failures_left: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with a service error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("", "")
        }
    }

    /// Fail the first `n` calls with a service error, then succeed.
    pub fn fail_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, system: Option<&str>, prompt: &str) -> Result<()> {
        self.calls.lock().push(RecordedCall {
            system: system.map(str::to_string),
            prompt: prompt.to_string(),
        });

        if self.should_fail {
            return Err(AppError::Service("Mock LLM failure".to_string()));
        }
        let transient = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if transient {
            return Err(AppError::Service("Mock transient failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(None, prompt)?;
        Ok(self.translation.clone())
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.record(Some(system), prompt)?;
        Ok(self.answer.clone())
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}

pub const MOCK_DIMENSIONS: usize = 64;

/// Deterministic bag-of-words embedder.
///
/// Each lowercase word is hashed into one of [`MOCK_DIMENSIONS`] buckets, so
/// texts that share words get similar vectors and identical texts get
/// identical vectors.
pub struct MockEmbedder {
    model: String,
    calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::with_model("mock-embedding")
    }

    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let hash = word
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
            vector[(hash % MOCK_DIMENSIONS as u64) as usize] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// In-memory store that counts calls and can be told to fail writes.
pub struct CountingStore {
    inner: InMemoryVectorStore,
    pub upserts: AtomicUsize,
    pub searches: AtomicUsize,
    fail_upserts: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryVectorStore::new(),
            upserts: AtomicUsize::new(0),
            searches: AtomicUsize::new(0),
            fail_upserts: false,
        }
    }

    pub fn failing_upserts() -> Self {
        Self {
            fail_upserts: true,
            ..Self::new()
        }
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

impl Default for CountingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for CountingStore {
    fn provider_name(&self) -> &'static str {
        "counting"
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.inner.create_collection(name, dimensions).await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.inner.delete_collection(name).await
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.inner.collection_exists(name).await
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.inner.count(collection).await
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        self.inner.list_ids(collection).await
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        self.inner.delete(collection, ids).await
    }

    async fn upsert(&self, collection: &str, entries: &[IndexEntry]) -> Result<usize> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts {
            return Err(AppError::Service("Mock store write failure".to_string()));
        }
        self.inner.upsert(collection, entries).await
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(collection, embedding, limit).await
    }
}

/// Convenience bundle of mocks with shared handles for assertions.
pub struct MockServices {
    pub llm: Arc<MockLLMClient>,
    pub embedder: Arc<MockEmbedder>,
    pub store: Arc<CountingStore>,
}

impl MockServices {
    pub fn new(answer: &str, translation: &str) -> Self {
        Self {
            llm: Arc::new(MockLLMClient::new(answer, translation)),
            embedder: Arc::new(MockEmbedder::new()),
            store: Arc::new(CountingStore::new()),
        }
    }

    pub fn services(&self) -> prashna::Services {
        prashna::Services {
            embedder: self.embedder.clone(),
            llm: self.llm.clone(),
            store: self.store.clone(),
        }
    }
}
