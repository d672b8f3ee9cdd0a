//! REST handlers for the embedding gateway

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorResponse, ValidatedJson};
use std::sync::Arc;

use crate::models::{
    HealthErrorResponse, HealthResponse, SearchRequest, SearchResponse, UpsertRequest,
    UpsertResponse,
};
use crate::repository::VectorRepository;
use crate::service::VectorService;

/// Embed texts and store them.
///
/// Embedding and store failures are reported in the body with HTTP 200.
#[utoipa::path(
    post,
    path = "/upsert",
    tag = "vectors",
    request_body = UpsertRequest,
    responses(
        (status = 200, description = "Outcome of the upsert; check `success`", body = UpsertResponse),
        (status = 400, description = "Invalid JSON, missing or mistyped field, or empty texts", body = ErrorResponse),
        (status = 415, description = "Body is not sent as application/json", body = ErrorResponse)
    )
)]
pub async fn upsert_vectors<R: VectorRepository>(
    State(service): State<Arc<VectorService<R>>>,
    ValidatedJson(request): ValidatedJson<UpsertRequest>,
) -> Json<UpsertResponse> {
    match service.upsert(request).await {
        Ok(ids) => Json(UpsertResponse::stored(ids)),
        Err(e) => {
            tracing::warn!(error = %e, "upsert failed");
            Json(UpsertResponse::failed(e.to_string()))
        }
    }
}

/// Similarity search for a free-text query.
///
/// Failures come back as an empty match list plus `error`, with HTTP 200.
#[utoipa::path(
    post,
    path = "/search",
    tag = "vectors",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matches, best first; check `error`", body = SearchResponse),
        (status = 400, description = "Invalid JSON, missing query, or top_k out of range", body = ErrorResponse),
        (status = 415, description = "Body is not sent as application/json", body = ErrorResponse)
    )
)]
pub async fn search_vectors<R: VectorRepository>(
    State(service): State<Arc<VectorService<R>>>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Json<SearchResponse> {
    match service.search(request).await {
        Ok(matches) => Json(SearchResponse::found(matches)),
        Err(e) => {
            tracing::warn!(error = %e, "search failed");
            Json(SearchResponse::failed(e.to_string()))
        }
    }
}

/// Vector store reachability.
///
/// Unlike the other endpoints, failure is reported through the status code.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 500, description = "Store unreachable", body = HealthErrorResponse)
    )
)]
pub async fn health_check<R: VectorRepository>(
    State(service): State<Arc<VectorService<R>>>,
) -> Response {
    match service.health().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy())).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthErrorResponse {
                    detail: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
