//! HTTP server initialization and lifecycle management
//!
//! This module handles all server setup:
//! - color-eyre and tracing initialization
//! - Embedding provider construction
//! - Vector store client construction
//! - Router assembly and graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum_helpers::server::{create_production_app, create_router};
use core_config::server::ServerConfig;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_vector::{
    EmbeddingProvider, IdStrategy, OpenAIProvider, PineconeRepository, QdrantRepository,
    VectorApiDoc, VectorRepository, VectorService,
};
use eyre::{Result, WrapErr};
use tracing::info;

use crate::config::{Config, EmbeddingBackend, StoreBackend};

/// Run the HTTP server
///
/// 1. Installs color-eyre and structured logging
/// 2. Builds the embedding provider and the store client, once per process
/// 3. Serves `/upsert`, `/search` and `/health` until SIGINT/SIGTERM
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, the store
/// cannot be reached during startup, or the listener cannot bind.
pub async fn run() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let embedder = build_embedder(config.embedding).await?;
    match embedder.dimensions() {
        0 => info!(
            model = embedder.model_name(),
            "Embedding provider ready; vector width known after the first call"
        ),
        dimensions => info!(model = embedder.model_name(), dimensions, "Embedding provider ready"),
    }

    match config.store {
        StoreBackend::Pinecone(pinecone) => {
            info!(index = %pinecone.index_name, "Connecting to Pinecone");
            let repository = PineconeRepository::new(pinecone)
                .await
                .wrap_err("Failed to resolve Pinecone index host")?;
            info!(host = repository.index_host(), "Pinecone index resolved");

            serve(
                repository,
                embedder,
                config.id_strategy,
                &config.server,
                config.shutdown_timeout,
            )
            .await
        }
        StoreBackend::Qdrant(qdrant) => {
            info!(url = %qdrant.url, collection = %qdrant.collection, "Connecting to Qdrant");
            let repository =
                QdrantRepository::new(qdrant).wrap_err("Failed to build Qdrant client")?;

            // Remote providers may not know their width until the first call.
            let dimensions = embedder.dimensions();
            if dimensions > 0 {
                repository
                    .ensure_collection(dimensions)
                    .await
                    .wrap_err("Failed to prepare Qdrant collection")?;
            }

            serve(
                repository,
                embedder,
                config.id_strategy,
                &config.server,
                config.shutdown_timeout,
            )
            .await
        }
    }
}

async fn build_embedder(backend: EmbeddingBackend) -> Result<Arc<dyn EmbeddingProvider>> {
    match backend {
        EmbeddingBackend::OpenAI(openai) => {
            let provider =
                OpenAIProvider::new(openai).wrap_err("Failed to build OpenAI embedding client")?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "local-embeddings")]
        EmbeddingBackend::FastEmbed(local) => {
            // Model download and ONNX session setup block.
            let provider =
                tokio::task::spawn_blocking(move || domain_vector::FastEmbedProvider::new(local))
                    .await
                    .wrap_err("fastembed loader task failed")?
                    .wrap_err("Failed to load fastembed model")?;
            Ok(Arc::new(provider))
        }
    }
}

async fn serve<R: VectorRepository + 'static>(
    repository: R,
    embedder: Arc<dyn EmbeddingProvider>,
    id_strategy: IdStrategy,
    server: &ServerConfig,
    shutdown_timeout: Duration,
) -> Result<()> {
    let service = VectorService::new(repository, embedder).with_id_strategy(id_strategy);
    info!(id_strategy = %service.id_strategy(), "Vector service ready");

    let app = create_router::<VectorApiDoc>(domain_vector::router(service))
        .wrap_err("Failed to build router")?;

    info!(
        "Starting embed gateway with graceful shutdown ({:?} timeout)",
        shutdown_timeout
    );

    create_production_app(app, server, shutdown_timeout, async {
        info!("Shutting down: no open connections to drain");
    })
    .await
    .wrap_err("Server error")?;

    info!("Embed gateway shutdown complete");
    Ok(())
}
