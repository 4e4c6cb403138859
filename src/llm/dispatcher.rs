use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use super::chat_model::{ChatMessage, ChatModel};
use crate::error::TranslationError;

/// Runs model calls on their own tasks, at most `max_concurrent` at a time.
///
/// The caller suspends on the spawned task's handle, so a slow model never ties
/// up the task that is serving other requests.
#[derive(Clone)]
pub struct ModelDispatcher {
    model: Arc<dyn ChatModel>,
    permits: Arc<Semaphore>,
}

impl ModelDispatcher {
    pub fn new(model: Arc<dyn ChatModel>, max_concurrent: usize) -> Self {
        Self {
            model,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Send `prompt` as a single user message and wait for the reply text.
    pub async fn invoke(&self, prompt: String) -> Result<String, TranslationError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| TranslationError::Dispatch(e.to_string()))?;

        let model = self.model.clone();
        let handle = tokio::spawn(async move {
            let _permit = permit;
            model.chat_completion(vec![ChatMessage::user(prompt)]).await
        });

        debug!("Model call dispatched");
        match handle.await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(TranslationError::ModelRuntime(e.to_string())),
            Err(e) => Err(TranslationError::Dispatch(e.to_string())),
        }
    }
}
