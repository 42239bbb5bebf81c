pub mod chat;
pub mod embedding;

/// Connection settings for one Ollama-compatible backend endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub completion_model: Option<String>,
    pub embedding_model: Option<String>,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            completion_model: None,
            embedding_model: None,
            max_tokens: None,
        }
    }
}
