use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or, env_required};

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub timeout_secs: u64,
}

impl QdrantConfig {
    pub fn new(url: String, collection: String) -> Self {
        Self {
            url,
            api_key: None,
            collection,
            timeout_secs: 30,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl FromEnv for QdrantConfig {
    /// Reads:
    /// - `QDRANT_URL` (default: `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (required)
    /// - `QDRANT_TIMEOUT_SECS` (default: 30)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", "http://localhost:6334"),
            api_key: env_optional("QDRANT_API_KEY"),
            collection: env_required("QDRANT_COLLECTION")?,
            timeout_secs: env_parse_or("QDRANT_TIMEOUT_SECS", 30)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", None),
                ("QDRANT_API_KEY", None),
                ("QDRANT_COLLECTION", Some("docs")),
                ("QDRANT_TIMEOUT_SECS", None),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://localhost:6334");
                assert!(config.api_key.is_none());
                assert_eq!(config.collection, "docs");
                assert_eq!(config.timeout_secs, 30);
            },
        );
    }

    #[test]
    fn test_from_env_requires_collection() {
        temp_env::with_var_unset("QDRANT_COLLECTION", || {
            assert!(QdrantConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        temp_env::with_vars(
            [
                ("QDRANT_COLLECTION", Some("docs")),
                ("QDRANT_TIMEOUT_SECS", Some("-1")),
            ],
            || {
                let err = QdrantConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("QDRANT_TIMEOUT_SECS"));
            },
        );
    }
}
