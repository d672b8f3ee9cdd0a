use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::PineconeConfig;
use super::config::normalize_url;
use crate::error::{VectorError, VectorResult};
use crate::models::{Match, Metadata, VectorRecord};
use crate::repository::VectorRepository;

const API_KEY_HEADER: &str = "Api-Key";

/// Pinecone-backed implementation of VectorRepository, over its REST API
pub struct PineconeRepository {
    client: Client,
    api_key: String,
    index_name: String,
    controller_url: String,
    index_host: String,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    status: IndexStatus,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    host: String,
    #[serde(default)]
    ready: Option<bool>,
}

#[derive(Debug, Serialize)]
struct PineconeVector<'a> {
    id: &'a str,
    values: &'a [f32],
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,
}

#[derive(Debug, Serialize)]
struct UpsertBody<'a> {
    vectors: Vec<PineconeVector<'a>>,
    #[serde(skip_serializing_if = "is_default_namespace")]
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertAck {
    #[serde(default)]
    upserted_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    vector: Vec<f32>,
    top_k: u32,
    #[serde(skip_serializing_if = "is_default_namespace")]
    namespace: &'a str,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    matches: Vec<ScoredVector>,
}

#[derive(Debug, Deserialize)]
struct ScoredVector {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl PineconeRepository {
    /// Builds the client and resolves the index host through the controller
    /// unless one is configured.
    pub async fn new(config: PineconeConfig) -> VectorResult<Self> {
        let configured_host = config.index_host.clone();
        let mut repository = Self::with_host(config, configured_host.unwrap_or_default())?;

        if repository.index_host.is_empty() {
            repository.index_host = repository.describe_index_host().await?;
        }

        tracing::info!(
            index = %repository.index_name,
            host = %repository.index_host,
            "Pinecone repository ready"
        );
        Ok(repository)
    }

    /// Builds the client against a known data-plane host, without any
    /// network calls.
    pub fn with_host(config: PineconeConfig, index_host: String) -> VectorResult<Self> {
        let controller_url = config.controller_url()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let index_host = if index_host.is_empty() {
            index_host
        } else {
            normalize_url(&index_host)
        };

        Ok(Self {
            client,
            api_key: config.api_key,
            index_name: config.index_name,
            controller_url,
            index_host,
        })
    }

    pub fn index_host(&self) -> &str {
        &self.index_host
    }

    async fn describe_index_host(&self) -> VectorResult<String> {
        let url = format!("{}/databases/{}", self.controller_url, self.index_name);
        let response = self.send(self.client.get(&url), "describe_index").await?;

        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| VectorError::Store(format!("Pinecone describe_index decode: {}", e)))?;

        if described.status.ready == Some(false) {
            tracing::warn!(index = %self.index_name, "Pinecone index is not ready yet");
        }
        Ok(normalize_url(&described.status.host))
    }

    /// Sends a request with credentials and turns transport failures and
    /// non-2xx answers into store errors.
    async fn send(&self, request: reqwest::RequestBuilder, op: &str) -> VectorResult<Response> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| VectorError::Store(format!("Pinecone {} request failed: {}", op, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Store(format!(
                "Pinecone {} failed ({}): {}",
                op, status, body
            )));
        }

        Ok(response)
    }
}

fn is_default_namespace(namespace: &&str) -> bool {
    namespace.is_empty()
}

/// Pinecone rejects null metadata values.
fn strip_nulls(metadata: &Metadata) -> Option<Metadata> {
    let cleaned: Metadata = metadata
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[async_trait]
impl VectorRepository for PineconeRepository {
    #[instrument(skip(self, records), fields(index = %self.index_name, count = records.len()))]
    async fn upsert(&self, records: Vec<VectorRecord>, namespace: &str) -> VectorResult<usize> {
        let body = UpsertBody {
            vectors: records
                .iter()
                .map(|r| PineconeVector {
                    id: &r.id,
                    values: &r.values,
                    metadata: strip_nulls(&r.metadata),
                })
                .collect(),
            namespace,
        };

        let url = format!("{}/vectors/upsert", self.index_host);
        let response = self.send(self.client.post(&url).json(&body), "upsert").await?;

        let ack: UpsertAck = response
            .json()
            .await
            .map_err(|e| VectorError::Store(format!("Pinecone upsert decode: {}", e)))?;

        Ok(ack.upserted_count.unwrap_or(records.len()))
    }

    #[instrument(skip(self, vector), fields(index = %self.index_name))]
    async fn query(
        &self,
        vector: Vec<f32>,
        namespace: &str,
        top_k: u32,
    ) -> VectorResult<Vec<Match>> {
        let body = QueryBody {
            vector,
            top_k,
            namespace,
            include_metadata: true,
            include_values: false,
        };

        let url = format!("{}/query", self.index_host);
        let response = self.send(self.client.post(&url).json(&body), "query").await?;

        let result: QueryResult = response
            .json()
            .await
            .map_err(|e| VectorError::Store(format!("Pinecone query decode: {}", e)))?;

        Ok(result
            .matches
            .into_iter()
            .map(|m| Match {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> VectorResult<()> {
        let url = format!("{}/databases", self.controller_url);
        let response = self.send(self.client.get(&url), "list_indexes").await?;

        // Reachability is what counts; a missing index is only worth a warning.
        if let Ok(Value::Array(indexes)) = response.json::<Value>().await {
            let listed = indexes
                .iter()
                .any(|name| name.as_str() == Some(self.index_name.as_str()));
            if !listed {
                tracing::warn!(index = %self.index_name, "index missing from Pinecone listing");
            }
        }

        Ok(())
    }
}
