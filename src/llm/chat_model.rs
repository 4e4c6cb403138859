use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Interface for a stateless chat model runtime.
/// Stateless means nothing is remembered between calls; every call carries its full conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one non-streaming chat completion and return the reply text.
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String>;

    /// Name of the model, for logs and the health endpoint.
    fn model_name(&self) -> &str;
}
