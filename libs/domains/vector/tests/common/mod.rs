#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use domain_vector::{
    EmbeddingProvider, Match, VectorError, VectorRecord, VectorRepository, VectorResult,
    VectorService,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::RwLock;

pub async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Deterministic embedder: identical text, identical unit vector.
#[derive(Default)]
pub struct HashEmbedder {
    calls: AtomicUsize,
}

pub const DIMENSIONS: usize = 16;

impl HashEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut hash = hasher.finish();

        let mut values = Vec::with_capacity(DIMENSIONS);
        for _ in 0..DIMENSIONS {
            values.push(((hash as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32);
            let mut next = DefaultHasher::new();
            hash.hash(&mut next);
            hash = next.finish();
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        values.iter().map(|v| v / norm).collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash"
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if texts.is_empty() {
            return Err(VectorError::Embedding("no input texts".into()));
        }
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

/// Embedder that is always down.
pub struct BrokenEmbedder;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    fn model_name(&self) -> &str {
        "broken"
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed_batch(&self, _texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        Err(VectorError::Embedding("model unavailable".into()))
    }
}

/// Exact cosine similarity over an in-process map, keyed by namespace then id.
///
/// Clones share state so a test can keep a handle after moving one into the router.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    namespaces: Arc<RwLock<HashMap<String, HashMap<String, VectorRecord>>>>,
    calls: Arc<AtomicUsize>,
    unreachable: bool,
}

impl InMemoryRepository {
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Upserts plus queries seen so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, HashMap::len)
    }

    fn check(&self) -> VectorResult<()> {
        if self.unreachable {
            return Err(VectorError::Store("connection refused".into()));
        }
        Ok(())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (na * nb)
}

#[async_trait]
impl VectorRepository for InMemoryRepository {
    async fn upsert(&self, records: Vec<VectorRecord>, namespace: &str) -> VectorResult<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let count = records.len();
        let mut namespaces = self.namespaces.write().await;
        let entries = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            entries.insert(record.id.clone(), record);
        }
        Ok(count)
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        namespace: &str,
        top_k: u32,
    ) -> VectorResult<Vec<Match>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let namespaces = self.namespaces.read().await;
        let mut matches: Vec<Match> = namespaces
            .get(namespace)
            .into_iter()
            .flat_map(|entries| entries.values())
            .map(|record| Match {
                id: record.id.clone(),
                score: cosine(&vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k as usize);
        Ok(matches)
    }

    async fn health_check(&self) -> VectorResult<()> {
        self.check()
    }
}

pub fn app(repository: InMemoryRepository, embedder: Arc<dyn EmbeddingProvider>) -> Router {
    domain_vector::router(VectorService::new(repository, embedder))
}
