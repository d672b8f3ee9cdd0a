use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or, env_required};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{EmbeddingProvider, ensure_batch_len};
use crate::error::{VectorError, VectorResult};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// OpenAI-compatible embedding endpoint configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Requested output size; only text-embedding-3 models honour it
    pub dimensions: Option<u32>,
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            dimensions: None,
            timeout_secs: 30,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Vector length this configuration produces, when it can be known upfront
    pub fn expected_dimensions(&self) -> Option<usize> {
        self.dimensions
            .map(|d| d as usize)
            .or_else(|| known_dimensions(&self.model))
    }
}

impl FromEnv for OpenAIConfig {
    /// Reads:
    /// - `OPENAI_API_KEY` (required)
    /// - `OPENAI_BASE_URL` (default: `https://api.openai.com/v1`)
    /// - `OPENAI_EMBEDDING_MODEL` (default: `text-embedding-3-small`)
    /// - `OPENAI_EMBEDDING_DIMENSIONS` (optional, must be positive)
    /// - `OPENAI_TIMEOUT_SECS` (default: 30)
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        let base_url = env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
        let model = env_or_default("OPENAI_EMBEDDING_MODEL", DEFAULT_OPENAI_MODEL);
        let dimensions = match env_optional("OPENAI_EMBEDDING_DIMENSIONS") {
            Some(_) => Some(env_parse_or("OPENAI_EMBEDDING_DIMENSIONS", NonZeroU32::MIN)?.get()),
            None => None,
        };
        let timeout_secs = env_parse_or("OPENAI_TIMEOUT_SECS", 30)?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimensions,
            timeout_secs,
        })
    }
}

fn known_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

/// Embeddings over HTTP against OpenAI or any server speaking its
/// `/embeddings` protocol.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
    dimensions: usize,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> VectorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            dimensions: config.expected_dimensions().unwrap_or_default(),
            config,
        })
    }

    pub fn from_env() -> VectorResult<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip_all, fields(model = %self.config.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(VectorError::Embedding("no input texts".to_string()));
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: self.config.dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VectorError::Embedding(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            VectorError::Embedding(format!("OpenAI response could not be decoded: {}", e))
        })?;

        // Sort by index to maintain order
        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        let embeddings: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();
        ensure_batch_len(texts.len(), &embeddings)?;

        tracing::debug!(count = embeddings.len(), "embedded batch");
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAIProvider {
        let config = OpenAIConfig::new("sk-test".to_string()).with_base_url(server.uri());
        OpenAIProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_embed_batch_restores_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "text-embedding-3-small",
                "input": ["first", "second"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "embedding": [0.0, 1.0], "index": 1 },
                    { "embedding": [1.0, 0.0], "index": 0 }
                ],
                "usage": { "prompt_tokens": 2, "total_tokens": 2 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embeddings = provider_for(&server)
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_api_error_becomes_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = provider_for(&server).embed("hello").await.unwrap_err();
        match err {
            VectorError::Embedding(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("rate limited"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_short_answer_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [1.0], "index": 0 }]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_empty_input_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider_for(&server).embed_batch(&[]).await.unwrap_err();
        assert!(matches!(err, VectorError::Embedding(_)));
    }

    #[test]
    fn test_expected_dimensions() {
        let config = OpenAIConfig::new("k".into());
        assert_eq!(config.expected_dimensions(), Some(1536));

        let config = config.with_model("text-embedding-3-large".into());
        assert_eq!(config.expected_dimensions(), Some(3072));

        let config = config.with_dimensions(256);
        assert_eq!(config.expected_dimensions(), Some(256));

        let config = OpenAIConfig::new("k".into()).with_model("nomic-embed-text".into());
        assert_eq!(config.expected_dimensions(), None);
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-env")),
                ("OPENAI_BASE_URL", Some("http://localhost:11434/v1/")),
                ("OPENAI_EMBEDDING_MODEL", Some("nomic-embed-text")),
                ("OPENAI_EMBEDDING_DIMENSIONS", Some("768")),
                ("OPENAI_TIMEOUT_SECS", None),
            ],
            || {
                let config = OpenAIConfig::from_env().unwrap();
                assert_eq!(config.api_key, "sk-env");
                assert_eq!(config.base_url, "http://localhost:11434/v1");
                assert_eq!(config.model, "nomic-embed-text");
                assert_eq!(config.dimensions, Some(768));
                assert_eq!(config.timeout_secs, 30);
            },
        );
    }

    #[test]
    fn test_config_rejects_zero_dimensions() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-env")),
                ("OPENAI_EMBEDDING_DIMENSIONS", Some("0")),
            ],
            || {
                let err = OpenAIConfig::from_env().unwrap_err();
                assert!(matches!(
                    err,
                    ConfigError::ParseError { ref key, .. } if key == "OPENAI_EMBEDDING_DIMENSIONS"
                ));
            },
        );
    }

    #[test]
    fn test_config_requires_api_key() {
        temp_env::with_var_unset("OPENAI_API_KEY", || {
            let err = OpenAIConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("OPENAI_API_KEY"));
        });
    }
}
