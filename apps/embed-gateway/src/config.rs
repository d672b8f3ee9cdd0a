use std::time::Duration;

use core_config::{Environment, FromEnv, env_optional, env_parse_or, server::ServerConfig};
#[cfg(feature = "local-embeddings")]
use domain_vector::FastEmbedConfig;
use domain_vector::{IdStrategy, OpenAIConfig, PineconeConfig, QdrantConfig};
use eyre::{Result, WrapErr, eyre};

/// Vector database the gateway writes to, selected by `VECTOR_STORE`
#[derive(Clone, Debug)]
pub enum StoreBackend {
    Pinecone(PineconeConfig),
    Qdrant(QdrantConfig),
}

impl StoreBackend {
    pub fn from_env() -> Result<Self> {
        let name = env_optional("VECTOR_STORE").unwrap_or_else(|| "pinecone".to_string());

        match name.to_lowercase().as_str() {
            "pinecone" => Ok(Self::Pinecone(
                PineconeConfig::from_env().wrap_err("Failed to load Pinecone configuration")?,
            )),
            "qdrant" => Ok(Self::Qdrant(
                QdrantConfig::from_env().wrap_err("Failed to load Qdrant configuration")?,
            )),
            other => Err(eyre!(
                "unknown VECTOR_STORE '{}' (expected pinecone or qdrant)",
                other
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pinecone(_) => "pinecone",
            Self::Qdrant(_) => "qdrant",
        }
    }
}

/// Embedding model source, selected by `EMBEDDING_PROVIDER`
#[derive(Clone, Debug)]
pub enum EmbeddingBackend {
    OpenAI(OpenAIConfig),
    #[cfg(feature = "local-embeddings")]
    FastEmbed(FastEmbedConfig),
}

#[cfg(feature = "local-embeddings")]
const DEFAULT_EMBEDDING_PROVIDER: &str = "fastembed";
#[cfg(not(feature = "local-embeddings"))]
const DEFAULT_EMBEDDING_PROVIDER: &str = "openai";

impl EmbeddingBackend {
    pub fn from_env() -> Result<Self> {
        let name = env_optional("EMBEDDING_PROVIDER")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_PROVIDER.to_string());

        match name.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI(
                OpenAIConfig::from_env().wrap_err("Failed to load OpenAI configuration")?,
            )),
            #[cfg(feature = "local-embeddings")]
            "fastembed" => Ok(Self::FastEmbed(
                FastEmbedConfig::from_env().wrap_err("Failed to load fastembed configuration")?,
            )),
            #[cfg(not(feature = "local-embeddings"))]
            "fastembed" => Err(eyre!(
                "EMBEDDING_PROVIDER=fastembed requires the `local-embeddings` feature"
            )),
            other => Err(eyre!(
                "unknown EMBEDDING_PROVIDER '{}' (expected openai or fastembed)",
                other
            )),
        }
    }
}

/// Application configuration, read once at startup
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreBackend,
    pub embedding: EmbeddingBackend,
    pub id_strategy: IdStrategy,
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env().wrap_err("Failed to load server configuration")?;
        let store = StoreBackend::from_env()?;
        let embedding = EmbeddingBackend::from_env()?;

        let id_strategy = match env_optional("UPSERT_ID_STRATEGY") {
            Some(raw) => raw.parse().map_err(|e: String| eyre!(e))?,
            None => IdStrategy::default(),
        };

        let shutdown_secs: u64 = env_parse_or("SHUTDOWN_TIMEOUT_SECS", 30)?;

        Ok(Self {
            environment,
            server,
            store,
            embedding,
            id_strategy,
            shutdown_timeout: Duration::from_secs(shutdown_secs),
        })
    }
}
