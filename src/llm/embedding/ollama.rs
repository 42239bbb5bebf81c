use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;

use super::{ l2_normalize, EmbeddingClient, EmbeddingResponse };
use crate::llm::LlmConfig;

#[derive(Debug)]
pub struct OllamaEmbeddingClient {
    http: HttpClient,
    base_url: String,
    embedding_model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingClient {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());
        let embed_model = model.unwrap_or_else(|| "bge-m3".to_string());

        Self {
            http: HttpClient::new(),
            base_url: url,
            embedding_model: embed_model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config.base_url.clone(), config.embedding_model.clone())
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(
        &self,
        text: &str
    ) -> Result<EmbeddingResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let req = EmbeddingRequest {
            model: self.embedding_model.clone(),
            prompt: text.to_string(),
        };
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<OllamaEmbeddingResponse>().await?;
        if data.embedding.is_empty() {
            return Err("Ollama embedding response carried an empty vector".into());
        }

        let mut embedding = data.embedding;
        l2_normalize(&mut embedding);
        Ok(EmbeddingResponse { embedding })
    }
}
