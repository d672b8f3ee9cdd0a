//! Vector Domain Library
//!
//! Embeds text through an external model and stores or searches the vectors
//! in an external vector database. Nothing is indexed, ranked or persisted
//! locally.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     router      │  ← POST /upsert, POST /search, GET /health
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │  VectorService  │  ← embed → assign ids → store
//! └───┬─────────┬───┘
//!     │         │
//! ┌───▼──────────────┐  ┌──────────────────┐
//! │ VectorRepository │  │ EmbeddingProvider│
//! │   (trait)        │  │    (trait)       │
//! └───┬──────────────┘  └───┬──────────────┘
//!     │                     │
//! ┌───▼──────────────┐  ┌───▼──────────────┐
//! │PineconeRepository│  │  OpenAIProvider  │
//! │ QdrantRepository │  │ FastEmbedProvider│
//! └──────────────────┘  └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_vector::{OpenAIProvider, PineconeConfig, PineconeRepository, VectorService};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = PineconeRepository::new(PineconeConfig::from_env()?).await?;
//! let embedder = Arc::new(OpenAIProvider::from_env()?);
//!
//! let service = VectorService::new(repository, embedder);
//! let app = domain_vector::handlers::router(service);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod models;
pub mod pinecone;
pub mod qdrant;
pub mod repository;
pub mod service;

// Re-export commonly used types
#[cfg(feature = "local-embeddings")]
pub use embedding::{FastEmbedConfig, FastEmbedProvider};
pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{VectorError, VectorResult};
pub use handlers::{VectorApiDoc, router};
pub use ids::IdStrategy;
pub use models::{
    Match, Metadata, SearchRequest, SearchResponse, UpsertRequest, UpsertResponse, VectorRecord,
};
pub use pinecone::{PineconeConfig, PineconeRepository};
pub use qdrant::{QdrantConfig, QdrantRepository};
pub use repository::VectorRepository;
pub use service::VectorService;
