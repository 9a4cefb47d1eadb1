//! Text chunking for document processing.
//!
//! Two strategies are available:
//! - **Character** (default): boundary-aware splitting (paragraphs, then
//!   sentences, then words) via `text-splitter`; sizes are in characters.
//! - **Word**: fixed windows of whitespace-separated words; sizes are in words.
//!
//! Either way no chunk is longer than `chunk_size`, and adjacent chunks share
//! at most `chunk_overlap` units.

use crate::types::{AppError, Chunk, Result, SourceDocument};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use text_splitter::{Characters, ChunkConfig, TextSplitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    #[default]
    Character,
    Word,
}

impl FromStr for ChunkingStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "character" | "char" | "recursive" => Ok(Self::Character),
            "word" | "words" => Ok(Self::Word),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown chunking strategy: {}. Use: character, word",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Character => write!(f, "character"),
            Self::Word => write!(f, "word"),
        }
    }
}

pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    strategy: ChunkingStrategy,
    splitter: TextSplitter<Characters>,
}

impl TextChunker {
    /// Fails unless `chunk_size >= 1` and `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize, strategy: ChunkingStrategy) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
            strategy,
            splitter: TextSplitter::new(config),
        })
    }

    pub fn with_character_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::new(chunk_size, chunk_overlap, ChunkingStrategy::Character)
    }

    pub fn with_word_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::new(chunk_size, chunk_overlap, ChunkingStrategy::Word)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn strategy(&self) -> ChunkingStrategy {
        self.strategy
    }

    /// Split raw text into chunk strings. Blank input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        match self.strategy {
            ChunkingStrategy::Character => self
                .splitter
                .chunks(text)
                .filter(|c| !c.trim().is_empty())
                .map(str::to_string)
                .collect(),
            ChunkingStrategy::Word => self.chunk_words(text),
        }
    }

    fn chunk_words(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let step = self.chunk_size - self.chunk_overlap;

        for i in (0..words.len()).step_by(step) {
            let end = (i + self.chunk_size).min(words.len());
            chunks.push(words[i..end].join(" "));
            if end == words.len() {
                break;
            }
        }

        chunks
    }

    /// Split a document into chunks carrying a content-hash id and their source.
    pub fn chunk_document(&self, document: &SourceDocument) -> Vec<Chunk> {
        let source = document.source_id();
        self.chunk(&document.text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                id: chunk_id(&source, index, &text),
                text,
                source: source.clone(),
                index,
            })
            .collect()
    }
}

/// Hex SHA-256 over source, position and text.
///
/// Stable across runs, so re-indexing an unchanged corpus overwrites entries
/// instead of duplicating them.
pub fn chunk_id(source: &str, index: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0u8]);
    hasher.update(index.to_le_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
