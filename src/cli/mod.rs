use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Vector Store Args ---
    /// Qdrant endpoint (gRPC port).
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6334")]
    pub qdrant_url: String,

    /// Optional API key for the Qdrant instance.
    #[arg(long, env = "QDRANT_API_KEY")]
    pub qdrant_api_key: Option<String>,

    /// Collection holding the indexed statute passages.
    #[arg(long, env = "QDRANT_COLLECTION", default_value = "leis")]
    pub collection: String,

    // --- Embedding Args ---
    /// Base URL of the Ollama-compatible embedding backend.
    #[arg(long, env = "EMBEDDING_BASE_URL", default_value = "http://localhost:11434")]
    pub embedding_base_url: String,

    /// Embedding model name. Must match the model used at indexing time.
    #[arg(long, env = "EMBEDDING_MODEL", default_value = "bge-m3")]
    pub embedding_model: String,

    // --- Generation Args ---
    /// Base URL of the Ollama generation backend.
    #[arg(long, env = "OLLAMA_HOST", default_value = "http://localhost:11434")]
    pub chat_base_url: String,

    /// Generation model name.
    #[arg(long, env = "OLLAMA_MODEL", default_value = "llama3.1:8b")]
    pub chat_model: String,

    /// Token budget for generated answers.
    #[arg(long, env = "GEN_MAX_TOKENS", default_value = "400")]
    pub gen_max_tokens: u32,

    /// Enable the generative answer mode for every request. Individual
    /// requests can still opt in via `use_llm` when this is off.
    #[arg(long, env = "USE_OLLAMA", default_value = "false")]
    pub use_llm: bool,

    // --- Rerank Args ---
    /// Base URL of the cross-encoder rerank endpoint.
    #[arg(long, env = "RERANK_BASE_URL", default_value = "http://localhost:8081")]
    pub rerank_base_url: String,

    /// Passages kept after rerank.
    #[arg(long, env = "RERANK_TOP_N", default_value = "5")]
    pub rerank_top_n: usize,

    // --- Pipeline Args ---
    /// Default recall size before rerank.
    #[arg(long, env = "RECALL_K", default_value = "12")]
    pub recall_k: usize,

    /// Default window of user messages merged into the retrieval query.
    #[arg(long, env = "HISTORY_WINDOW", default_value = "8")]
    pub history_window: usize,

    /// Cap on stored messages per conversation, oldest evicted first.
    #[arg(long, env = "HISTORY_CAP", default_value = "50")]
    pub history_cap: usize,

    /// Per-passage character budget in the assembled context.
    #[arg(long, env = "CONTEXT_PASSAGE_CHARS", default_value = "900")]
    pub max_passage_chars: usize,

    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,
}
