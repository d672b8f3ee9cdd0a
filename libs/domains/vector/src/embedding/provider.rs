use async_trait::async_trait;

use crate::error::{VectorError, VectorResult};

/// Turns text into fixed-length vectors.
///
/// Implementations hold their model or HTTP client for the lifetime of the
/// process and must be safe to call from many requests at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for logs
    fn model_name(&self) -> &str;

    /// Length of every vector this provider returns
    fn dimensions(&self) -> usize;

    /// One vector per input, in input order. Fails on an empty list.
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::Embedding("No embedding returned".to_string()))
    }
}

/// Rejects provider answers that do not line up with the request.
pub fn ensure_batch_len(expected: usize, embeddings: &[Vec<f32>]) -> VectorResult<()> {
    if embeddings.len() != expected {
        return Err(VectorError::Embedding(format!(
            "provider returned {} embeddings for {} inputs",
            embeddings.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_batch_len() {
        assert!(ensure_batch_len(2, &[vec![0.0], vec![1.0]]).is_ok());

        let err = ensure_batch_len(3, &[vec![0.0]]).unwrap_err();
        assert!(matches!(err, VectorError::Embedding(ref msg) if msg.contains("1 embeddings for 3")));
    }
}
