use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::chat_model::{ChatMessage, ChatModel};

/// Ollama LLM implementation using the native `/api/chat` endpoint
pub struct OllamaLLM {
    client: Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    keep_alive: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaLLM {
    pub fn new(
        client: Client,
        base_url: String,
        model: String,
        temperature: Option<f32>,
        keep_alive: Option<String>,
    ) -> Self {
        info!("Initialized OllamaLLM: model={}, base_url={}", model, base_url);
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            keep_alive,
        }
    }
}

#[async_trait]
impl ChatModel for OllamaLLM {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: &messages,
            stream: false,
            options: self
                .temperature
                .map(|t| serde_json::json!({ "temperature": t })),
            keep_alive: self.keep_alive.as_deref(),
        };

        debug!("Ollama chat request: model={}, messages={}", self.model, messages.len());
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama chat failed ({}): {}", status, body);
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
