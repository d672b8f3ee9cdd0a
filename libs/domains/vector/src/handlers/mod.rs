mod rest;

use axum::{
    Router,
    routing::{get, post},
};
use axum_helpers::{ErrorCode, ErrorResponse};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    HealthErrorResponse, HealthResponse, Match, SearchRequest, SearchResponse, UpsertRequest,
    UpsertResponse,
};
use crate::repository::VectorRepository;
use crate::service::VectorService;

pub use rest::{health_check, search_vectors, upsert_vectors};

/// OpenAPI documentation for the gateway endpoints
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Embed Gateway",
        description = "Text embedding and vector search over a managed vector database"
    ),
    paths(rest::upsert_vectors, rest::search_vectors, rest::health_check),
    components(
        schemas(
            UpsertRequest, UpsertResponse,
            SearchRequest, SearchResponse, Match,
            HealthResponse, HealthErrorResponse,
            ErrorResponse, ErrorCode
        )
    ),
    tags(
        (name = "vectors", description = "Embed-and-store and embed-and-search"),
        (name = "health", description = "Vector store reachability")
    )
)]
pub struct VectorApiDoc;

/// Router for `/upsert`, `/search` and `/health`
pub fn router<R: VectorRepository + 'static>(service: VectorService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/upsert", post(upsert_vectors::<R>))
        .route("/search", post(search_vectors::<R>))
        .route("/health", get(health_check::<R>))
        .with_state(shared_service)
}
