use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
    Filter, PointId, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
    point_id::PointIdOptions,
};
use tracing::instrument;
use uuid::Uuid;

use super::QdrantConfig;
use super::payload::{NAMESPACE_FIELD, from_payload, to_payload};
use crate::error::{VectorError, VectorResult};
use crate::models::{Match, VectorRecord};
use crate::repository::VectorRepository;

/// Qdrant-backed implementation of VectorRepository.
///
/// All namespaces share one collection and are told apart by a payload
/// field. Point ids are derived from (namespace, id) so an upsert of the same
/// id in the same namespace overwrites the earlier point.
pub struct QdrantRepository {
    client: Qdrant,
    collection: String,
}

impl QdrantRepository {
    pub fn new(config: QdrantConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build Qdrant client: {}", e)))?;

        Ok(Self {
            client,
            collection: config.collection,
        })
    }

    pub fn from_client(client: Qdrant, collection: String) -> Self {
        Self { client, collection }
    }

    /// Creates the collection (cosine, `dimensions` wide) and its namespace
    /// index if the collection does not exist yet.
    pub async fn ensure_collection(&self, dimensions: usize) -> VectorResult<()> {
        if self.client.collection_exists(&self.collection).await? {
            return Ok(());
        }

        tracing::info!(collection = %self.collection, dimensions, "creating Qdrant collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await?;

        self.client
            .create_field_index(CreateFieldIndexCollectionBuilder::new(
                &self.collection,
                NAMESPACE_FIELD,
                FieldType::Keyword,
            ))
            .await?;

        Ok(())
    }
}

/// Stable point id for a caller id inside a namespace.
pub(crate) fn point_id(namespace: &str, id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{}/{}", namespace, id).as_bytes())
}

fn namespace_filter(namespace: &str) -> Filter {
    Filter::must([Condition::matches(NAMESPACE_FIELD, namespace.to_string())])
}

fn point_id_to_string(point_id: Option<PointId>) -> Option<String> {
    match point_id?.point_id_options? {
        PointIdOptions::Uuid(uuid) => Some(uuid),
        PointIdOptions::Num(num) => Some(num.to_string()),
    }
}

#[async_trait]
impl VectorRepository for QdrantRepository {
    #[instrument(skip(self, records), fields(collection = %self.collection, count = records.len()))]
    async fn upsert(&self, records: Vec<VectorRecord>, namespace: &str) -> VectorResult<usize> {
        let count = records.len();
        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let id = point_id(namespace, &record.id);
                PointStruct::new(
                    id.to_string(),
                    record.values,
                    to_payload(record.metadata, &record.id, namespace),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;

        Ok(count)
    }

    #[instrument(skip(self, vector), fields(collection = %self.collection))]
    async fn query(
        &self,
        vector: Vec<f32>,
        namespace: &str,
        top_k: u32,
    ) -> VectorResult<Vec<Match>> {
        let request = SearchPointsBuilder::new(&self.collection, vector, top_k as u64)
            .filter(namespace_filter(namespace))
            .with_payload(true);

        let results = self.client.search_points(request).await?;

        Ok(results
            .result
            .into_iter()
            .map(|point| {
                let (stored_id, metadata) = from_payload(point.payload);
                Match {
                    id: stored_id
                        .or_else(|| point_id_to_string(point.id))
                        .unwrap_or_default(),
                    score: point.score,
                    metadata,
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> VectorResult<()> {
        let reply = self.client.health_check().await?;
        tracing::debug!(version = %reply.version, "Qdrant reachable");
        Ok(())
    }
}
