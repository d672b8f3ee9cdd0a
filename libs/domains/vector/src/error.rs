use core_config::ConfigError;
use thiserror::Error;

/// Closed set of failures the gateway can report.
///
/// Every external error type is mapped into one of these at the call site
/// that produced it. Handlers report them in the response body, never as an
/// HTTP status, except `/health`.
#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::Store(format!("Qdrant: {}", err))
    }
}

impl From<ConfigError> for VectorError {
    fn from(err: ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_failing_side() {
        assert_eq!(
            VectorError::Store("index unreachable".into()).to_string(),
            "Store error: index unreachable"
        );
        assert_eq!(
            VectorError::Embedding("model missing".into()).to_string(),
            "Embedding error: model missing"
        );
    }

    #[test]
    fn test_config_error_conversion_keeps_key() {
        let err: VectorError = ConfigError::MissingEnvVar("PINECONE_INDEX".into()).into();
        assert!(matches!(err, VectorError::Config(ref msg) if msg.contains("PINECONE_INDEX")));
    }
}
