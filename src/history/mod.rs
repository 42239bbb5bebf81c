pub mod memory;

use async_trait::async_trait;
use std::error::Error;

use crate::models::chat::ChatMessage;

/// Per-conversation ordered message history. Mutations on one id are
/// serialized; reads return a snapshot that may trail an in-flight
/// append by at most one message. The interface is Result-based so a
/// durable backend can be swapped in without touching the orchestrator.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Allocates a fresh conversation with an empty message sequence.
    async fn create(&self) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// Snapshot of the current history; unknown ids read as empty.
    async fn get(
        &self,
        conversation_id: &str
    ) -> Result<Vec<ChatMessage>, Box<dyn Error + Send + Sync>>;

    /// Appends atomically, creating the conversation if absent.
    async fn append(
        &self,
        conversation_id: &str,
        message: ChatMessage
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Atomically swaps the whole sequence. Backs the documented
    /// history-override merge policy.
    async fn replace(
        &self,
        conversation_id: &str,
        messages: Vec<ChatMessage>
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Keeps only the most recent `max_messages`, oldest dropped first.
    /// Idempotent.
    async fn truncate(
        &self,
        conversation_id: &str,
        max_messages: usize
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Clears the sequence; the id stays valid for later appends.
    async fn reset(&self, conversation_id: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}
