//! Vector stores.
//!
//! # Vector Store Providers
//!
//! - `memory` (default) - process-local store with cosine similarity
//! - `pinecone` - managed cloud service, one namespace per collection
//!
//! Select the provider in `prashna.toml`:
//! ```toml
//! [vector_store]
//! provider = "pinecone"
//! index_host = "https://marathichatbot-abc123.svc.us-east-1.pinecone.io"
//! ```

pub mod pinecone;
pub mod vectorstore;

pub use pinecone::PineconeStore;
pub use vectorstore::{InMemoryVectorStore, VectorStore, VectorStoreProvider};
