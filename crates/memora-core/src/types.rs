use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Embedding
// =============================================================================

/// A vector produced by the embedding service, with its provenance.
///
/// Fields are private so an `Embedding` cannot be altered after it is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    source_text: String,
    vector: Vec<f32>,
    model: String,
    created_at: DateTime<Utc>,
}

impl Embedding {
    pub fn new(
        source_text: impl Into<String>,
        vector: Vec<f32>,
        model: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            vector,
            model: model.into(),
            created_at,
        }
    }

    /// The text that was embedded.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Identifier of the model that produced the vector.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// When the embedding call completed.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of dimensions in the vector.
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

// =============================================================================
// MemoryRecord
// =============================================================================

/// A stored memory: a unique id and the vector it is searched by.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique key within a store.
    pub id: String,
    /// The stored vector.
    pub embedding: Vec<f32>,
}

impl MemoryRecord {
    /// Build a record from a raw vector.
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            embedding,
        }
    }

    /// Build a record carrying a copy of an embedding's vector.
    pub fn from_embedding(id: impl Into<String>, embedding: &Embedding) -> Self {
        Self::new(id, embedding.vector().to_vec())
    }
}

// =============================================================================
// SearchHit
// =============================================================================

/// A single scored result of a similarity search.
///
/// Hits are owned snapshots: the similarity belongs to the query that
/// produced it, and `vector` is a copy of the stored vector at search time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Id of the matching record.
    pub record_id: String,
    /// Cosine similarity between the query and the record.
    pub similarity: f64,
    /// Copy of the record's vector when it was scored.
    pub vector: Vec<f32>,
}
