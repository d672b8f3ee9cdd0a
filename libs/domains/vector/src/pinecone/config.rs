use core_config::{ConfigError, FromEnv, env_optional, env_parse_or, env_required};

/// Pinecone connection configuration
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Deployment environment/region, e.g. `us-west1-gcp`
    pub environment: Option<String>,
    pub index_name: String,
    /// Data-plane host; resolved through the controller when absent
    pub index_host: Option<String>,
    /// Controller override; derived from `environment` when absent
    pub controller_url: Option<String>,
    pub timeout_secs: u64,
}

impl PineconeConfig {
    pub fn new(api_key: String, environment: String, index_name: String) -> Self {
        Self {
            api_key,
            environment: Some(environment),
            index_name,
            index_host: None,
            controller_url: None,
            timeout_secs: 30,
        }
    }

    pub fn with_index_host(mut self, host: String) -> Self {
        self.index_host = Some(host);
        self
    }

    pub fn with_controller_url(mut self, url: String) -> Self {
        self.controller_url = Some(url);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Base URL of the control plane (index listing and description)
    pub fn controller_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.controller_url {
            return Ok(normalize_url(url));
        }
        match &self.environment {
            Some(env) => Ok(format!("https://controller.{}.pinecone.io", env)),
            None => Err(ConfigError::MissingEnvVar("PINECONE_ENV".to_string())),
        }
    }
}

impl FromEnv for PineconeConfig {
    /// Reads:
    /// - `PINECONE_API_KEY` (required)
    /// - `PINECONE_ENV` (required unless `PINECONE_CONTROLLER_URL` is set)
    /// - `PINECONE_INDEX` (required)
    /// - `PINECONE_INDEX_HOST`, `PINECONE_CONTROLLER_URL` (optional overrides)
    /// - `PINECONE_TIMEOUT_SECS` (default: 30)
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            api_key: env_required("PINECONE_API_KEY")?,
            environment: env_optional("PINECONE_ENV"),
            index_name: env_required("PINECONE_INDEX")?,
            index_host: env_optional("PINECONE_INDEX_HOST"),
            controller_url: env_optional("PINECONE_CONTROLLER_URL"),
            timeout_secs: env_parse_or("PINECONE_TIMEOUT_SECS", 30)?,
        };

        // Fail at startup rather than on the first health check.
        config.controller_url()?;
        Ok(config)
    }
}

/// Adds `https://` to bare hosts and drops trailing slashes.
pub(crate) fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "PINECONE_API_KEY",
        "PINECONE_ENV",
        "PINECONE_INDEX",
        "PINECONE_INDEX_HOST",
        "PINECONE_CONTROLLER_URL",
        "PINECONE_TIMEOUT_SECS",
    ];

    fn with_env<F: FnOnce()>(values: [Option<&str>; 6], f: F) {
        let vars: Vec<(&str, Option<&str>)> = VARS.into_iter().zip(values).collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_from_env_derives_controller() {
        with_env(
            [Some("key"), Some("us-west1-gcp"), Some("docs"), None, None, None],
            || {
                let config = PineconeConfig::from_env().unwrap();
                assert_eq!(config.api_key, "key");
                assert_eq!(config.index_name, "docs");
                assert_eq!(config.timeout_secs, 30);
                assert_eq!(
                    config.controller_url().unwrap(),
                    "https://controller.us-west1-gcp.pinecone.io"
                );
            },
        );
    }

    #[test]
    fn test_from_env_requires_index() {
        with_env([Some("key"), Some("env"), None, None, None, None], || {
            let err = PineconeConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PINECONE_INDEX"));
        });
    }

    #[test]
    fn test_from_env_requires_environment_without_controller_override() {
        with_env([Some("key"), None, Some("docs"), None, None, None], || {
            let err = PineconeConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PINECONE_ENV"));
        });
    }

    #[test]
    fn test_controller_override_replaces_environment() {
        with_env(
            [
                Some("key"),
                None,
                Some("docs"),
                Some("docs-abc.svc.pinecone.io"),
                Some("http://localhost:5080/"),
                Some("5"),
            ],
            || {
                let config = PineconeConfig::from_env().unwrap();
                assert_eq!(config.controller_url().unwrap(), "http://localhost:5080");
                assert_eq!(config.index_host.as_deref(), Some("docs-abc.svc.pinecone.io"));
                assert_eq!(config.timeout_secs, 5);
            },
        );
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("idx.svc.pinecone.io"), "https://idx.svc.pinecone.io");
        assert_eq!(normalize_url("http://127.0.0.1:9000/"), "http://127.0.0.1:9000");
    }
}
