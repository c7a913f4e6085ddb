//! Built-in skills backed by a vector store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use memora_vector::VectorStore;

use crate::error::SkillError;
use crate::registry::{Skill, SkillRegistry};

/// Stores its input as a new memory and returns the generated id.
pub struct RememberSkill {
    store: Arc<dyn VectorStore>,
    cancel: CancellationToken,
}

impl RememberSkill {
    pub fn new(store: Arc<dyn VectorStore>, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }
}

#[async_trait]
impl Skill for RememberSkill {
    fn name(&self) -> &str {
        "remember"
    }

    fn description(&self) -> &str {
        "Store the input text as a new memory"
    }

    async fn execute(&self, input: &str) -> Result<String, SkillError> {
        if input.trim().is_empty() {
            return Err(SkillError::InvalidInput(
                "Text to remember must not be blank".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        self.store.remember(&id, input, &self.cancel).await?;
        info!(id = %id, text_len = input.len(), "Memory stored");
        Ok(id)
    }
}

/// Searches memories similar to its input.
///
/// Output is one `similarity<TAB>id` line per hit, best first.
pub struct RecallSkill {
    store: Arc<dyn VectorStore>,
    limit: usize,
    cancel: CancellationToken,
}

impl RecallSkill {
    pub fn new(store: Arc<dyn VectorStore>, limit: usize, cancel: CancellationToken) -> Self {
        Self {
            store,
            limit,
            cancel,
        }
    }
}

#[async_trait]
impl Skill for RecallSkill {
    fn name(&self) -> &str {
        "recall"
    }

    fn description(&self) -> &str {
        "Find stored memories most similar to the input text"
    }

    async fn execute(&self, input: &str) -> Result<String, SkillError> {
        if input.trim().is_empty() {
            return Err(SkillError::InvalidInput(
                "Query must not be blank".to_string(),
            ));
        }

        let hits = self.store.search(input, self.limit, &self.cancel).await?;
        Ok(hits
            .iter()
            .map(|hit| format!("{:.3}\t{}", hit.similarity, hit.record_id))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Register `remember` and `recall` against `store`.
pub fn register_memory_skills(
    registry: &mut SkillRegistry,
    store: Arc<dyn VectorStore>,
    recall_limit: usize,
    cancel: CancellationToken,
) {
    registry.register(Arc::new(RememberSkill::new(
        Arc::clone(&store),
        cancel.clone(),
    )));
    registry.register(Arc::new(RecallSkill::new(store, recall_limit, cancel)));
}
