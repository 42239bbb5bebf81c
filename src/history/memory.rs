use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::history::ConversationStore;
use crate::models::chat::ChatMessage;

/// Process-memory conversation store. One coarse lock is enough at this
/// contention profile; it is only held for the in-memory mutation,
/// never across an external call.
#[derive(Default)]
pub struct MemoryConversationStore {
    conversations: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        let id = Uuid::new_v4().simple().to_string();
        let mut conversations = self.conversations.lock().await;
        conversations.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn get(
        &self,
        conversation_id: &str
    ) -> Result<Vec<ChatMessage>, Box<dyn Error + Send + Sync>> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        conversation_id: &str,
        message: ChatMessage
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn replace(
        &self,
        conversation_id: &str,
        messages: Vec<ChatMessage>
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        conversations.insert(conversation_id.to_string(), messages);
        Ok(())
    }

    async fn truncate(
        &self,
        conversation_id: &str,
        max_messages: usize
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        if let Some(messages) = conversations.get_mut(conversation_id) {
            if messages.len() > max_messages {
                let excess = messages.len() - max_messages;
                messages.drain(..excess);
            }
        }
        Ok(())
    }

    async fn reset(&self, conversation_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        if let Some(messages) = conversations.get_mut(conversation_id) {
            messages.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_id_reads_empty() {
        let store = MemoryConversationStore::new();
        assert!(store.get("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_creates_conversation_and_preserves_order() {
        let store = MemoryConversationStore::new();
        store.append("c1", ChatMessage::user("primeira")).await.unwrap();
        store.append("c1", ChatMessage::assistant("segunda")).await.unwrap();

        let messages = store.get("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "primeira");
        assert_eq!(messages[1].content, "segunda");
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        let store = Arc::new(MemoryConversationStore::new());
        let id = store.create().await.unwrap();

        let mut handles = Vec::new();
        for caller in 0..8 {
            let store = Arc::clone(&store);
            let id = id.clone();
            handles.push(
                tokio::spawn(async move {
                    for i in 0..25 {
                        store
                            .append(&id, ChatMessage::user(format!("{}-{}", caller, i))).await
                            .unwrap();
                    }
                })
            );
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get(&id).await.unwrap().len(), 200);
    }

    #[tokio::test]
    async fn truncate_keeps_most_recent_in_order() {
        let store = MemoryConversationStore::new();
        for i in 0..10 {
            store.append("c1", ChatMessage::user(format!("m{}", i))).await.unwrap();
        }

        store.truncate("c1", 4).await.unwrap();
        let messages = store.get("c1").await.unwrap();
        let contents: Vec<&str> = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["m6", "m7", "m8", "m9"]);

        // idempotent
        store.truncate("c1", 4).await.unwrap();
        assert_eq!(store.get("c1").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn truncate_above_len_is_a_noop() {
        let store = MemoryConversationStore::new();
        store.append("c1", ChatMessage::user("só uma")).await.unwrap();
        store.truncate("c1", 50).await.unwrap();
        assert_eq!(store.get("c1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_but_keeps_id_usable() {
        let store = MemoryConversationStore::new();
        let id = store.create().await.unwrap();
        store.append(&id, ChatMessage::user("antes")).await.unwrap();

        store.reset(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_empty());

        store.append(&id, ChatMessage::user("depois")).await.unwrap();
        let messages = store.get(&id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "depois");
    }
}
