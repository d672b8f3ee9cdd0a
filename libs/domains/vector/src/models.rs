use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

/// Arbitrary JSON object attached to stored vectors.
pub type Metadata = Map<String, Value>;

/// Largest `top_k` the gateway forwards to a store.
pub const MAX_TOP_K: u32 = 10_000;

pub const DEFAULT_TOP_K: u32 = 5;

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

/// Texts to embed and store.
///
/// `metadata`, when present, is attached to every vector of the batch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpsertRequest {
    #[validate(length(min = 1, message = "texts must contain at least one entry"))]
    pub texts: Vec<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

/// Free-text similarity query.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 10_000, message = "top_k must be between 1 and 10000"))]
    #[schema(default = 5, minimum = 1, maximum = 10_000)]
    pub top_k: u32,
}

/// A vector ready to be written to a store. Never persisted by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpsertResponse {
    pub success: bool,
    pub ids: Vec<String>,
    pub error: Option<String>,
}

impl UpsertResponse {
    pub fn stored(ids: Vec<String>) -> Self {
        Self {
            success: true,
            ids,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            ids: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// One ranked hit returned by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Match {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub matches: Vec<Match>,
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn found(matches: Vec<Match>) -> Self {
        Self {
            matches,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Body of a failed `/health` call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_defaults_top_k() {
        let request: SearchRequest = serde_json::from_str(r#"{"query":"hello"}"#).unwrap();
        assert_eq!(request.top_k, DEFAULT_TOP_K);
        assert!(request.namespace.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_search_request_rejects_zero_top_k() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query":"hello","top_k":0}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_upsert_request_rejects_empty_texts() {
        let request: UpsertRequest = serde_json::from_str(r#"{"texts":[]}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("texts"));
    }

    #[test]
    fn test_upsert_response_serializes_null_error() {
        let json = serde_json::to_value(UpsertResponse::stored(vec!["0".into()])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "ids": ["0"], "error": null}));
    }

    #[test]
    fn test_failed_search_has_no_matches() {
        let response = SearchResponse::failed("boom");
        assert!(response.matches.is_empty());
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_match_metadata_defaults_to_empty() {
        let m: Match = serde_json::from_str(r#"{"id":"1","score":0.5}"#).unwrap();
        assert!(m.metadata.is_empty());
    }
}
