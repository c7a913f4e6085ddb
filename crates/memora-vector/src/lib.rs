//! Memora Vector crate - embedding boundary, embedder, similarity, and store.
//!
//! Provides the embedding service trait with an HTTP client and test
//! doubles, the `Embedder` that attaches provenance to vectors, the cosine
//! similarity primitive, and an in-memory vector store with brute-force
//! top-K search.

pub mod embedder;
pub mod embedding;
pub mod similarity;
pub mod store;

pub use embedder::Embedder;
pub use embedding::{
    DynEmbeddingService, EmbeddingRequest, EmbeddingService, HttpEmbeddingService, MockEmbedding,
    StaticEmbedding,
};
pub use similarity::cosine_similarity;
pub use store::{InMemoryVectorStore, VectorStore};
