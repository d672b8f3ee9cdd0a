//! In-process embeddings via fastembed (ONNX Runtime).
//!
//! Configuration:
//! - `FASTEMBED_MODEL` (default: `all-minilm-l6-v2`, 384 dimensions)
//! - `FASTEMBED_CACHE_DIR` (optional ONNX model cache directory)

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional};
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use tokio::sync::Mutex;
use tracing::instrument;

use super::{EmbeddingProvider, ensure_batch_len};
use crate::error::{VectorError, VectorResult};

pub const DEFAULT_FASTEMBED_MODEL: &str = "all-minilm-l6-v2";

#[derive(Debug, Clone)]
pub struct FastEmbedConfig {
    pub model: String,
    pub cache_dir: Option<PathBuf>,
}

impl Default for FastEmbedConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_FASTEMBED_MODEL.to_string(),
            cache_dir: None,
        }
    }
}

impl FromEnv for FastEmbedConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            model: env_optional("FASTEMBED_MODEL")
                .unwrap_or_else(|| DEFAULT_FASTEMBED_MODEL.to_string()),
            cache_dir: env_optional("FASTEMBED_CACHE_DIR").map(PathBuf::from),
        })
    }
}

/// Maps short model names to fastembed variants.
fn parse_model_name(name: &str) -> Option<EmbeddingModel> {
    let model = match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            EmbeddingModel::AllMiniLML6V2
        }
        "all-minilm-l12-v2" => EmbeddingModel::AllMiniLML12V2,
        "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
        "multilingual-e5-small" => EmbeddingModel::MultilingualE5Small,
        "multilingual-e5-base" => EmbeddingModel::MultilingualE5Base,
        "nomic-embed-text-v1.5" => EmbeddingModel::NomicEmbedTextV15,
        _ => return None,
    };
    Some(model)
}

/// Local ONNX embedding model.
///
/// `TextEmbedding::embed` needs `&mut self`, so the model sits behind a mutex
/// and inference runs on the blocking pool.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
}

impl FastEmbedProvider {
    /// Loads (downloading on first use) the configured model.
    pub fn new(config: FastEmbedConfig) -> VectorResult<Self> {
        let variant = parse_model_name(&config.model).ok_or_else(|| {
            VectorError::Config(format!("unsupported FASTEMBED_MODEL '{}'", config.model))
        })?;

        let dimensions = TextEmbedding::get_model_info(&variant)
            .map(|info| info.dim)
            .map_err(|e| VectorError::Config(format!("unknown fastembed model: {}", e)))?;

        let mut options = TextInitOptions::new(variant).with_show_download_progress(false);
        if let Some(dir) = config.cache_dir {
            options = options.with_cache_dir(dir);
        }

        let embedding = TextEmbedding::try_new(options).map_err(|e| {
            VectorError::Embedding(format!("Failed to initialize fastembed model: {}", e))
        })?;

        tracing::info!(model = %config.model, dimensions, "fastembed model loaded");

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            model_name: config.model,
            dimensions,
        })
    }

    pub fn from_env() -> VectorResult<Self> {
        Self::new(FastEmbedConfig::from_env()?)
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip_all, fields(model = %self.model_name, count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(VectorError::Embedding("no input texts".to_string()));
        }

        let model = self.model.clone();
        let batch = texts.to_vec();

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut model = model.blocking_lock();
            model.embed(batch, None)
        })
        .await
        .map_err(|e| VectorError::Embedding(format!("fastembed task failed: {}", e)))?
        .map_err(|e| VectorError::Embedding(format!("fastembed inference failed: {}", e)))?;

        ensure_batch_len(texts.len(), &embeddings)?;
        Ok(embeddings)
    }
}
