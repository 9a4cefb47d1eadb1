//! Lazily built, explicitly rebuildable index.
//!
//! The first [`KnowledgeBase::ensure_built`] builds the index; later calls
//! return the cached handle. Builds are serialized by an async mutex and the
//! finished index is swapped in atomically, so readers keep the previous index
//! while a rebuild runs.

use crate::rag::indexing::{IndexingPipeline, VectorIndex};
use crate::types::{IndexReport, Result};
use arc_swap::ArcSwapOption;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub struct KnowledgeBase {
    pipeline: IndexingPipeline,
    source_directory: PathBuf,
    current: ArcSwapOption<VectorIndex>,
    last_report: ArcSwapOption<IndexReport>,
    build_lock: Mutex<()>,
}

impl KnowledgeBase {
    /// Constructs without building anything.
    pub fn new(pipeline: IndexingPipeline, source_directory: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            source_directory: source_directory.into(),
            current: ArcSwapOption::empty(),
            last_report: ArcSwapOption::empty(),
            build_lock: Mutex::new(()),
        }
    }

    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    pub fn collection(&self) -> &str {
        self.pipeline.collection()
    }

    pub fn embedding_model(&self) -> &str {
        self.pipeline.embedding_model()
    }

    /// Return the index, building it first if this is the first call.
    ///
    /// Concurrent first callers wait for a single build.
    pub async fn ensure_built(&self) -> Result<Arc<VectorIndex>> {
        if let Some(index) = self.current.load_full() {
            return Ok(index);
        }

        let _guard = self.build_lock.lock().await;
        if let Some(index) = self.current.load_full() {
            return Ok(index);
        }
        self.build_locked().await
    }

    /// Build again from the source directory and swap the result in.
    pub async fn rebuild(&self) -> Result<Arc<VectorIndex>> {
        let _guard = self.build_lock.lock().await;
        self.build_locked().await
    }

    async fn build_locked(&self) -> Result<Arc<VectorIndex>> {
        let (index, report) = self.pipeline.build_index(&self.source_directory).await?;
        let index = Arc::new(index);

        self.current.store(Some(index.clone()));
        self.last_report.store(Some(Arc::new(report)));
        info!(
            collection = index.collection(),
            entries = index.entry_count(),
            "Knowledge base ready"
        );

        Ok(index)
    }

    pub fn current(&self) -> Option<Arc<VectorIndex>> {
        self.current.load_full()
    }

    pub fn is_built(&self) -> bool {
        self.current.load().is_some()
    }

    pub fn last_report(&self) -> Option<IndexReport> {
        self.last_report.load_full().map(|report| (*report).clone())
    }
}
