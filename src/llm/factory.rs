use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use reqwest::Client;
use tracing::info;

use super::chat_model::ChatModel;
use super::ollama_llm::OllamaLLM;
use super::openai_compatible_llm::OpenAICompatibleLLM;
use crate::config::LlmConfig;

/// Create the chat model named by `config.provider`.
pub fn create_llm(config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    info!("Initializing LLM: {}", config.provider);

    let mut builder = Client::builder();
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build()?;

    match config.provider.as_str() {
        "ollama_llm" => Ok(Arc::new(OllamaLLM::new(
            client,
            config.base_url.clone(),
            config.model.clone(),
            config.temperature,
            config.keep_alive.clone(),
        ))),
        "openai_compatible_llm" | "openai_llm" | "vllm_llm" | "lmstudio_llm" => {
            Ok(Arc::new(OpenAICompatibleLLM::new(
                client,
                config.base_url.clone(),
                config.model.clone(),
                config.api_key.clone(),
                config.temperature,
            )))
        }
        _ => Err(anyhow::anyhow!("Unsupported LLM provider: {}", config.provider)),
    }
}
