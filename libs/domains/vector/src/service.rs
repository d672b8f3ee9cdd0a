use std::sync::Arc;

use tracing::instrument;

use crate::embedding::{EmbeddingProvider, ensure_batch_len};
use crate::error::{VectorError, VectorResult};
use crate::ids::IdStrategy;
use crate::models::{MAX_TOP_K, Match, SearchRequest, UpsertRequest, VectorRecord};
use crate::repository::VectorRepository;

/// Vector service sequencing embedding and storage.
///
/// Built once at startup and shared by every request; it holds no
/// per-request state.
pub struct VectorService<R: VectorRepository> {
    repository: R,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    id_strategy: IdStrategy,
}

impl<R: VectorRepository> VectorService<R> {
    pub fn new(repository: R, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            repository,
            embedding_provider,
            id_strategy: IdStrategy::default(),
        }
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    /// Embeds `texts`, stores one vector per text and returns their ids in
    /// input order.
    #[instrument(skip(self, request), fields(count = request.texts.len(), namespace = ?request.namespace))]
    pub async fn upsert(&self, request: UpsertRequest) -> VectorResult<Vec<String>> {
        if request.texts.is_empty() {
            return Err(VectorError::Validation("texts must not be empty".to_string()));
        }

        let namespace = request.namespace.unwrap_or_default();
        let embeddings = self.embedding_provider.embed_batch(&request.texts).await?;
        ensure_batch_len(request.texts.len(), &embeddings)?;

        let ids = self.id_strategy.assign(&request.texts, &namespace);
        let metadata = request.metadata.unwrap_or_default();

        let records = ids
            .iter()
            .zip(embeddings)
            .map(|(id, values)| VectorRecord {
                id: id.clone(),
                values,
                metadata: metadata.clone(),
            })
            .collect();

        let written = self.repository.upsert(records, &namespace).await?;
        if written != ids.len() {
            tracing::warn!(expected = ids.len(), written, "store acknowledged a different count");
        }

        Ok(ids)
    }

    /// Embeds the query and returns at most `top_k` matches in the store's order.
    #[instrument(skip(self, request), fields(top_k = request.top_k, namespace = ?request.namespace))]
    pub async fn search(&self, request: SearchRequest) -> VectorResult<Vec<Match>> {
        if request.top_k == 0 || request.top_k > MAX_TOP_K {
            return Err(VectorError::Validation(format!(
                "top_k must be between 1 and {}",
                MAX_TOP_K
            )));
        }

        let namespace = request.namespace.unwrap_or_default();
        let vector = self.embedding_provider.embed(&request.query).await?;

        let mut matches = self
            .repository
            .query(vector, &namespace, request.top_k)
            .await?;
        matches.truncate(request.top_k as usize);

        Ok(matches)
    }

    pub async fn health(&self) -> VectorResult<()> {
        self.repository.health_check().await
    }
}
