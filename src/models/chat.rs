use serde::{ Serialize, Deserialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<ChatMessage>,
}

/// One chat turn as received from the HTTP layer.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatTurnRequest {
    /// Existing conversation to continue; a fresh one is created when absent.
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
    /// Recall size before rerank.
    #[serde(default)]
    pub k: Option<usize>,
    /// Enables the generative answer mode for this request, in addition
    /// to the process-wide flag.
    #[serde(default)]
    pub use_llm: Option<bool>,
    /// Caller-supplied history override; assistant turns in it are
    /// dropped, the rest replaces the stored non-assistant turns.
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
    /// Window of user messages merged into the retrieval query.
    #[serde(default)]
    pub max_history: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    pub answer: String,
    pub citations: Vec<String>,
    pub conversation_id: String,
    pub messages: Vec<ChatMessage>,
}
