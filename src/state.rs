use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::auth::{KeyLookup, StaticKeyTable};
use crate::config::Config;
use crate::llm::{create_llm, ChatModel, ModelDispatcher};
use crate::translation::Translator;

/// Shared by every handler. Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Translator,
    pub keys: Arc<dyn KeyLookup>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let model = create_llm(&config.llm_config)?;
        let keys = Arc::new(StaticKeyTable::from_config(&config.auth_config));
        info!("Loaded {} API keys", keys.key_count());
        Ok(Self::with_parts(config, model, keys))
    }

    pub fn with_parts(config: Config, model: Arc<dyn ChatModel>, keys: Arc<dyn KeyLookup>) -> Self {
        let dispatcher = ModelDispatcher::new(model, config.llm_config.max_concurrent_calls);
        let translator = Translator::new(dispatcher, &config.translation_config);
        Self {
            config: Arc::new(config),
            translator,
            keys,
            started_at: Utc::now(),
        }
    }
}
