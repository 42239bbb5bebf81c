use async_trait::async_trait;
use log::{ info, warn };
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{ Condition, Filter, SearchPointsBuilder };
use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::llm::embedding::EmbeddingClient;

/// One passage recalled from the vector index. Every metadata field the
/// pipeline reads is optional with an explicit default, so a sparse or
/// malformed payload never breaks a turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievedPassage {
    #[serde(default)]
    pub texto: String,
    pub lei: Option<String>,
    pub artigo: Option<String>,
    pub url_oficial: Option<String>,
    pub chunk_seq: Option<u64>,
    pub score_vec: f32,
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding request failed: {0}")]
    Embedding(String),
    #[error("vector store unavailable: {0}")]
    Connectivity(String),
}

/// Recall capability: query text in, up to k scored passages out, in
/// the store's own descending-similarity order.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(
        &self,
        query: &str,
        k: usize
    ) -> Result<Vec<RetrievedPassage>, RetrievalError>;

    /// Same contract as `search`, candidates restricted to exact payload
    /// matches on statute and/or article before similarity ranking.
    async fn search_filtered(
        &self,
        query: &str,
        k: usize,
        lei: Option<&str>,
        artigo: Option<&str>
    ) -> Result<Vec<RetrievedPassage>, RetrievalError>;
}

pub struct QdrantRetriever {
    client: Qdrant,
    collection: String,
    embedding_client: Arc<dyn EmbeddingClient>,
}

impl QdrantRetriever {
    pub fn new(
        url: &str,
        api_key: Option<String>,
        collection: String,
        embedding_client: Arc<dyn EmbeddingClient>
    ) -> Result<Self, RetrievalError> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| RetrievalError::Connectivity(e.to_string()))?;

        Ok(Self { client, collection, embedding_client })
    }

    async fn embed(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        let resp = self.embedding_client
            .embed(query).await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;
        Ok(resp.embedding)
    }

    async fn run_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<Filter>
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let vector = self.embed(query).await?;

        let mut request = SearchPointsBuilder::new(&self.collection, vector, k as u64)
            .with_payload(true);
        if let Some(f) = filter {
            request = request.filter(f);
        }

        let response = self.client
            .search_points(request).await
            .map_err(|e| RetrievalError::Connectivity(e.to_string()))?;

        info!("Vector search returned {} hit(s) for k={}", response.result.len(), k);

        let passages = response.result
            .into_iter()
            .map(|point| RetrievedPassage::from_payload(point.score, &point.payload))
            .collect();
        Ok(passages)
    }
}

#[async_trait]
impl Retriever for QdrantRetriever {
    async fn search(
        &self,
        query: &str,
        k: usize
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        self.run_search(query, k, None).await
    }

    async fn search_filtered(
        &self,
        query: &str,
        k: usize,
        lei: Option<&str>,
        artigo: Option<&str>
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let mut must = Vec::new();
        if let Some(lei) = lei {
            must.push(Condition::matches("lei", lei.to_string()));
        }
        if let Some(artigo) = artigo {
            must.push(Condition::matches("artigo", artigo.to_string()));
        }

        let filter = if must.is_empty() { None } else { Some(Filter::must(must)) };
        self.run_search(query, k, filter).await
    }
}

impl RetrievedPassage {
    /// Builds the typed record from a raw qdrant payload. Fields that
    /// fail to convert are skipped with a warning and fall back to
    /// their defaults.
    pub fn from_payload(
        score: f32,
        payload: &HashMap<String, qdrant_client::qdrant::Value>
    ) -> Self {
        let mut map = serde_json::Map::new();
        for (key, value) in payload {
            match serde_json::to_value(value) {
                Ok(val) => {
                    map.insert(key.clone(), val);
                }
                Err(err) => warn!("Skipping payload field '{}': {}", key, err),
            }
        }

        Self {
            texto: text_field(&map, "texto").unwrap_or_default(),
            lei: text_field(&map, "lei"),
            artigo: text_field(&map, "artigo"),
            url_oficial: text_field(&map, "url_oficial"),
            chunk_seq: map.get("chunk_seq").and_then(JsonValue::as_u64),
            score_vec: score,
        }
    }
}

/// Reads a payload field as text, tolerating numeric article/statute
/// identifiers.
fn text_field(map: &serde_json::Map<String, JsonValue>, key: &str) -> Option<String> {
    match map.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
