//! Embedder: validated, cancellable embedding calls with provenance.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use memora_core::config::DEFAULT_EMBEDDING_MODEL;
use memora_core::error::MemoraError;
use memora_core::types::Embedding;

use crate::embedding::{DynEmbeddingService, EmbeddingRequest, EmbeddingService};

/// Turns text into an [`Embedding`] through an [`EmbeddingService`].
///
/// Blank text is rejected before any request is made. Each accepted call
/// issues exactly one request with the embedder's fixed model identifier.
pub struct Embedder {
    service: Arc<dyn DynEmbeddingService>,
    model: String,
    last_created_at: Mutex<Option<DateTime<Utc>>>,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model", &self.model)
            .finish()
    }
}

impl Embedder {
    /// Create an embedder over a concrete service.
    pub fn new(service: impl EmbeddingService + 'static, model: impl Into<String>) -> Self {
        Self::new_dyn(Arc::new(service), model)
    }

    /// Create an embedder over a shared, type-erased service.
    pub fn new_dyn(service: Arc<dyn DynEmbeddingService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
            last_created_at: Mutex::new(None),
        }
    }

    /// Create an embedder using `text-embedding-3-large`.
    pub fn with_default_model(service: impl EmbeddingService + 'static) -> Self {
        Self::new(service, DEFAULT_EMBEDDING_MODEL)
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed `text`, aborting the in-flight request if `cancel` fires.
    ///
    /// Errors:
    /// - `InvalidInput` if `text` is empty or whitespace-only.
    /// - `EmbeddingFailed` if the service fails.
    /// - `Cancelled` if the token fires before the service answers.
    pub async fn embed(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Embedding, MemoraError> {
        if text.trim().is_empty() {
            return Err(MemoraError::invalid_input("Text to embed must not be blank"));
        }

        debug!(text_len = text.len(), model = %self.model, "Requesting embedding");

        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let vector = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(model = %self.model, "Embedding request cancelled");
                return Err(MemoraError::Cancelled);
            }
            result = self.service.embed_boxed(&request) => result.map_err(|e| {
                warn!(error = %e, model = %self.model, "Embedding request failed");
                match e {
                    MemoraError::EmbeddingFailed(_) | MemoraError::Cancelled => e,
                    other => MemoraError::EmbeddingFailed(other.to_string()),
                }
            })?,
        };

        let created_at = self.next_timestamp()?;
        Ok(Embedding::new(text, vector, self.model.as_str(), created_at))
    }

    /// Current time, never earlier than the previous embedding's timestamp.
    fn next_timestamp(&self) -> Result<DateTime<Utc>, MemoraError> {
        let mut last = self
            .last_created_at
            .lock()
            .map_err(|e| MemoraError::Storage(format!("Lock poisoned: {}", e)))?;
        let now = Utc::now();
        let stamp = match *last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        *last = Some(stamp);
        Ok(stamp)
    }
}
