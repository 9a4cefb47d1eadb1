//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use prashna::PrashnaConfig;
use std::path::Path;

/// Config pointing at `dir`, indexing `.txt` files, with fast retries.
pub fn test_config(dir: &Path) -> PrashnaConfig {
    let mut config = PrashnaConfig::default();
    config.rag.source_directory = dir.to_path_buf();
    config.rag.glob = "**/*.txt".to_string();
    config.rag.chunk_size = 200;
    config.rag.index_collection_name = "test".to_string();
    config.retry.max_retries = 3;
    config.retry.initial_backoff_ms = 1;
    config.retry.max_backoff_ms = 5;
    config.retry.request_timeout_secs = 5;
    config
}

pub fn write_doc(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}
