use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{Match, VectorRecord};

/// Repository trait for the external vector database.
///
/// Namespaces partition an index; the empty string is the default namespace.
/// Indexing, ranking and persistence all happen on the remote side.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Write records, replacing any existing entry with the same id in the
    /// namespace. Returns how many records the store acknowledged.
    ///
    /// Batches are not atomic: a failure may leave part of the batch written.
    async fn upsert(&self, records: Vec<VectorRecord>, namespace: &str) -> VectorResult<usize>;

    /// Top `top_k` matches for `vector`, best first, with metadata.
    async fn query(&self, vector: Vec<f32>, namespace: &str, top_k: u32)
    -> VectorResult<Vec<Match>>;

    /// Confirms the store is reachable
    async fn health_check(&self) -> VectorResult<()>;
}
