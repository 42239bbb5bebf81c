pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod history;
pub mod llm;
pub mod models;
pub mod query;
pub mod rerank;
pub mod retrieval;
pub mod server;

use agent::{ AgentOptions, LegalAgent };
use cli::Args;
use history::memory::MemoryConversationStore;
use llm::LlmConfig;
use llm::chat::new_client as new_chat_client;
use llm::embedding::new_client as new_embedding_client;
use log::info;
use rerank::Reranker;
use retrieval::QdrantRetriever;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Qdrant URL: {}", args.qdrant_url);
    info!("Qdrant Collection: {}", args.collection);
    info!("Embedding Backend: {} ({})", args.embedding_base_url, args.embedding_model);
    info!("Generation Backend: {} ({})", args.chat_base_url, args.chat_model);
    info!("Rerank Endpoint: {}", args.rerank_base_url);
    info!("Recall k: {} | Rerank top_n: {}", args.recall_k, args.rerank_top_n);
    info!("History Window: {} | History Cap: {}", args.history_window, args.history_cap);
    info!("Generative Mode (global): {}", args.use_llm);
    info!("-------------------------");

    let embedding_config = LlmConfig {
        base_url: Some(args.embedding_base_url.clone()),
        embedding_model: Some(args.embedding_model.clone()),
        completion_model: None,
        max_tokens: None,
    };
    let embedding_client = new_embedding_client(&embedding_config)?;

    let chat_config = LlmConfig {
        base_url: Some(args.chat_base_url.clone()),
        completion_model: Some(args.chat_model.clone()),
        embedding_model: None,
        max_tokens: Some(args.gen_max_tokens),
    };
    let chat_client = new_chat_client(&chat_config)?;

    let retriever = QdrantRetriever::new(
        &args.qdrant_url,
        args.qdrant_api_key.clone(),
        args.collection.clone(),
        embedding_client
    )?;

    let reranker = Reranker::over_http(args.rerank_base_url.clone());
    let history = Arc::new(MemoryConversationStore::new());

    let options = AgentOptions {
        recall_k: args.recall_k,
        rerank_top_n: args.rerank_top_n,
        history_window: args.history_window,
        history_cap: args.history_cap,
        use_llm: args.use_llm,
        max_passage_chars: args.max_passage_chars,
    };

    let agent = Arc::new(
        LegalAgent::new(Arc::new(retriever), reranker, chat_client, history, options)
    );

    let server = Server::new(args.server_addr.clone(), agent);
    server.run().await?;

    Ok(())
}
