//! Vector store trait and an in-memory implementation with brute-force
//! cosine similarity search.
//!
//! Search is O(n) in the number of stored records, which is acceptable for
//! the process-lifetime stores this crate targets.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use memora_core::error::MemoraError;
use memora_core::types::{Embedding, MemoryRecord, SearchHit};

use crate::embedder::Embedder;
use crate::similarity::cosine_similarity;

/// Storage and similarity search over memory records.
///
/// Callers hold an `Arc<dyn VectorStore>` so an in-memory store, a fake, or
/// another index can be swapped in without touching the [`Embedder`].
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a record, replacing any record with the same id.
    ///
    /// Fails with `InvalidInput` if the id is blank.
    fn store(&self, record: MemoryRecord) -> Result<(), MemoraError>;

    /// Remove a record. Removing an unknown id succeeds.
    fn delete(&self, id: &str) -> Result<(), MemoraError>;

    /// Embed `query` and return up to `limit` hits by descending similarity.
    ///
    /// A blank query or a zero limit returns no hits without embedding.
    /// Equal similarities are ordered by ascending record id. A NaN score
    /// ranks below every finite score.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchHit>, MemoraError>;

    /// Number of stored records. A store that cannot be read reports zero.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The embedder used for queries and for [`VectorStore::remember`].
    fn embedder(&self) -> &Embedder;

    /// Embed `text` and store the vector under `id`.
    ///
    /// The id is checked before the embedding call; a cancelled or failed
    /// embedding leaves the store untouched.
    async fn remember(
        &self,
        id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Embedding, MemoraError> {
        validate_id(id)?;
        let embedding = self.embedder().embed(text, cancel).await?;
        self.store(MemoryRecord::from_embedding(id, &embedding))?;
        Ok(embedding)
    }
}

fn validate_id(id: &str) -> Result<(), MemoraError> {
    if id.trim().is_empty() {
        return Err(MemoraError::invalid_input("Record id must not be blank"));
    }
    Ok(())
}

/// In-memory vector store keyed by record id.
///
/// Thread-safe via a single interior `RwLock`; clones share the same map.
/// The lock is never held across the embedding await.
#[derive(Debug, Clone)]
pub struct InMemoryVectorStore {
    records: Arc<RwLock<HashMap<String, MemoryRecord>>>,
    embedder: Arc<Embedder>,
}

impl InMemoryVectorStore {
    /// Create an empty store that embeds queries with `embedder`.
    pub fn new(embedder: Arc<Embedder>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            embedder,
        }
    }

    /// Clone of the record stored under `id`, if any.
    pub fn get(&self, id: &str) -> Result<Option<MemoryRecord>, MemoraError> {
        let records = self
            .records
            .read()
            .map_err(|e| MemoraError::Storage(format!("Lock poisoned: {}", e)))?;
        Ok(records.get(id).cloned())
    }

    pub fn contains(&self, id: &str) -> Result<bool, MemoraError> {
        let records = self
            .records
            .read()
            .map_err(|e| MemoraError::Storage(format!("Lock poisoned: {}", e)))?;
        Ok(records.contains_key(id))
    }

    /// Score every record against an already-embedded query.
    ///
    /// Returns up to `limit` hits, sorted by descending similarity with
    /// ascending id as the tie-break. NaN scores sort last. The reported
    /// similarity is left as computed.
    pub fn search_by_vector(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, MemoraError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let records = self
            .records
            .read()
            .map_err(|e| MemoraError::Storage(format!("Lock poisoned: {}", e)))?;

        let mut hits: Vec<SearchHit> = records
            .values()
            .map(|record| SearchHit {
                record_id: record.id.clone(),
                similarity: cosine_similarity(query, &record.embedding),
                vector: record.embedding.clone(),
            })
            .collect();
        drop(records);

        hits.sort_by(rank);
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Descending similarity, then ascending record id.
///
/// NaN compares as negative infinity regardless of its sign bit.
fn rank(a: &SearchHit, b: &SearchHit) -> Ordering {
    rank_key(b.similarity)
        .total_cmp(&rank_key(a.similarity))
        .then_with(|| a.record_id.cmp(&b.record_id))
}

fn rank_key(similarity: f64) -> f64 {
    if similarity.is_nan() {
        f64::NEG_INFINITY
    } else {
        similarity
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn store(&self, record: MemoryRecord) -> Result<(), MemoraError> {
        validate_id(&record.id)?;
        let mut records = self
            .records
            .write()
            .map_err(|e| MemoraError::Storage(format!("Lock poisoned: {}", e)))?;
        let replaced = records.insert(record.id.clone(), record).is_some();
        debug!(replaced, total = records.len(), "Record stored");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), MemoraError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| MemoraError::Storage(format!("Lock poisoned: {}", e)))?;
        let removed = records.remove(id).is_some();
        debug!(id, removed, "Record delete");
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchHit>, MemoraError> {
        if query.trim().is_empty() {
            debug!("Blank query, returning no results");
            return Ok(Vec::new());
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query, cancel).await?;
        let hits = self.search_by_vector(query_embedding.vector(), limit)?;

        debug!(
            limit,
            returned = hits.len(),
            top = hits.first().map(|h| h.similarity),
            "Search complete"
        );
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    fn embedder(&self) -> &Embedder {
        &self.embedder
    }
}
