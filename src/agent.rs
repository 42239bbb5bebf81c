use log::{ error, info, warn };
use std::cmp::max;
use std::sync::Arc;

use crate::config::prompt;
use crate::context;
use crate::history::ConversationStore;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ChatMessage, ChatTurnRequest, ChatTurnResponse, Role };
use crate::query;
use crate::rerank::Reranker;
use crate::retrieval::Retriever;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Recall size before rerank when the request does not set one.
    pub recall_k: usize,
    /// Passages kept after rerank.
    pub rerank_top_n: usize,
    /// User messages merged into the retrieval query.
    pub history_window: usize,
    /// Cap on stored messages per conversation, oldest evicted first.
    pub history_cap: usize,
    /// Process-wide generative answer flag; per-request `use_llm` can
    /// still enable generation when this is off.
    pub use_llm: bool,
    /// Per-passage character budget in the assembled context.
    pub max_passage_chars: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            recall_k: 12,
            rerank_top_n: 5,
            history_window: 8,
            history_cap: 50,
            use_llm: false,
            max_passage_chars: context::DEFAULT_MAX_PASSAGE_CHARS,
        }
    }
}

/// Drives one chat turn through recall, rerank, context assembly and
/// answer composition, and owns the conversation history around it.
pub struct LegalAgent {
    retriever: Arc<dyn Retriever>,
    reranker: Reranker,
    generator: Arc<dyn ChatClient>,
    history: Arc<dyn ConversationStore>,
    options: AgentOptions,
}

impl LegalAgent {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        reranker: Reranker,
        generator: Arc<dyn ChatClient>,
        history: Arc<dyn ConversationStore>,
        options: AgentOptions
    ) -> Self {
        Self { retriever, reranker, generator, history, options }
    }

    pub fn history_store(&self) -> &Arc<dyn ConversationStore> {
        &self.history
    }

    /// Executes one full turn. Never returns an error to the caller:
    /// connectivity failures, empty recall and generation failures all
    /// degrade into a well-formed answer/citations/history response.
    ///
    /// Merge policy for `history` overrides: the stored sequence is
    /// replaced wholesale by the override filtered to non-assistant
    /// turns. Assistant output is always recomputed server-side, so
    /// caller-supplied assistant turns are dropped.
    pub async fn chat_turn(&self, request: ChatTurnRequest) -> ChatTurnResponse {
        let conversation_id = self.resolve_conversation_id(request.conversation_id.as_deref()).await;

        if let Some(override_history) = request.history {
            let kept: Vec<ChatMessage> = override_history
                .into_iter()
                .filter(|m| m.role != Role::Assistant)
                .collect();
            if let Err(e) = self.history.replace(&conversation_id, kept).await {
                warn!("History override write failed: {}", e);
            }
        }
        self.record(&conversation_id, ChatMessage::user(request.message.clone())).await;
        if let Err(e) = self.history.truncate(&conversation_id, self.options.history_cap).await {
            warn!("History truncate failed: {}", e);
        }

        let window = request.max_history.unwrap_or(self.options.history_window);
        let retrieval_query = self.build_retrieval_query(&conversation_id, window).await;
        // Rerank stays anchored to the current question, not the merged
        // window.
        let anchor = query::normalize(&request.message);
        info!("Retrieval query: '{}'", retrieval_query);

        let k = max(8, request.k.unwrap_or(self.options.recall_k));
        let recalled = match self.retriever.search(&retrieval_query, k).await {
            Ok(passages) => passages,
            Err(e) => {
                error!("Vector recall failed: {}", e);
                return self.degraded(&conversation_id, prompt::INDEX_UNAVAILABLE).await;
            }
        };

        let ranked = match
            self.reranker.rerank(&anchor, recalled, Some(self.options.rerank_top_n)).await
        {
            Ok(ranked) => ranked,
            Err(e) => {
                error!("Rerank failed: {}", e);
                return self.degraded(&conversation_id, prompt::INDEX_UNAVAILABLE).await;
            }
        };

        if ranked.is_empty() {
            return self.degraded(&conversation_id, prompt::INSUFFICIENT_BASIS).await;
        }

        let (context_block, citations) = context::assemble(&ranked, self.options.max_passage_chars);

        let use_llm = self.options.use_llm || request.use_llm.unwrap_or(false);
        let answer = if use_llm {
            self.generate_or_fall_back(&context_block, &request.message).await
        } else {
            prompt::extractive_answer(&context_block)
        };

        self.record(&conversation_id, ChatMessage::assistant(answer.clone())).await;
        let messages = self.snapshot(&conversation_id).await;

        ChatTurnResponse {
            answer,
            citations,
            conversation_id,
            messages,
        }
    }

    async fn resolve_conversation_id(&self, supplied: Option<&str>) -> String {
        match supplied {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ =>
                match self.history.create().await {
                    Ok(id) => id,
                    Err(e) => {
                        // The in-memory store cannot fail here; a durable
                        // backend might, and the turn still needs an id.
                        warn!("Conversation create failed, using local id: {}", e);
                        uuid::Uuid::new_v4().simple().to_string()
                    }
                }
        }
    }

    /// Joins the last `window` user messages in arrival order and
    /// normalizes the result into the effective retrieval query.
    async fn build_retrieval_query(&self, conversation_id: &str, window: usize) -> String {
        let messages = self.snapshot(conversation_id).await;
        let user_messages: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect();
        let start = user_messages.len().saturating_sub(window);
        let joined = user_messages[start..].join("\n");
        query::normalize(&joined)
    }

    async fn generate_or_fall_back(&self, context_block: &str, question: &str) -> String {
        let full_prompt = prompt::build_prompt(context_block, question);
        match self.generator.complete(&full_prompt).await {
            Ok(resp) if !resp.response.trim().is_empty() => resp.response,
            Ok(_) => {
                warn!("Generation returned empty text, falling back to extractive answer");
                prompt::extractive_answer(context_block)
            }
            Err(e) => {
                warn!("Generation failed, falling back to extractive answer: {}", e);
                prompt::extractive_answer(context_block)
            }
        }
    }

    /// Terminal path for degraded turns: the notice is persisted as the
    /// assistant turn and returned with empty citations.
    async fn degraded(&self, conversation_id: &str, notice: &str) -> ChatTurnResponse {
        self.record(conversation_id, ChatMessage::assistant(notice)).await;
        ChatTurnResponse {
            answer: notice.to_string(),
            citations: Vec::new(),
            conversation_id: conversation_id.to_string(),
            messages: self.snapshot(conversation_id).await,
        }
    }

    async fn record(&self, conversation_id: &str, message: ChatMessage) {
        if let Err(e) = self.history.append(conversation_id, message).await {
            warn!("History write failed: {}", e);
        }
    }

    async fn snapshot(&self, conversation_id: &str) -> Vec<ChatMessage> {
        match self.history.get(conversation_id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("History read failed: {}", e);
                Vec::new()
            }
        }
    }
}
