use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;

use super::RerankScorer;

/// Cross-encoder scorer behind a text-embeddings-inference style
/// `/rerank` endpoint.
#[derive(Debug)]
pub struct HttpRerankScorer {
    http: HttpClient,
    base_url: String,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [String],
}

#[derive(Deserialize)]
struct RerankRow {
    index: usize,
    score: f32,
}

impl HttpRerankScorer {
    pub fn new(base_url: String) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
        }
    }
}

#[async_trait]
impl RerankScorer for HttpRerankScorer {
    async fn score(
        &self,
        query: &str,
        texts: &[String]
    ) -> Result<Vec<f32>, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/rerank", self.base_url.trim_end_matches('/'));
        let resp = self.http
            .post(&url)
            .json(&(RerankRequest { query, texts }))
            .send().await?
            .error_for_status()?;
        let rows = resp.json::<Vec<RerankRow>>().await?;

        // Rows come back ordered by score; map them onto input positions.
        let mut scores = vec![f32::NEG_INFINITY; texts.len()];
        for row in rows {
            if row.index >= scores.len() {
                return Err(
                    format!("rerank row index {} out of range for {} texts", row.index, texts.len()).into()
                );
            }
            scores[row.index] = row.score;
        }
        if scores.iter().any(|s| *s == f32::NEG_INFINITY) {
            return Err("rerank response did not score every text".into());
        }
        Ok(scores)
    }
}
