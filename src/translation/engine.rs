use tracing::{debug, error, info, warn};

use super::parser::parse_translations;
use super::prompt::build_prompt;
use super::request::TranslationRequest;
use super::retry::{RetryState, Step};
use crate::config::TranslationConfig;
use crate::error::TranslationError;
use crate::llm::ModelDispatcher;

/// Drives prompt construction, model calls, parsing and the count-mismatch retries.
#[derive(Clone)]
pub struct Translator {
    dispatcher: ModelDispatcher,
    max_attempts: u32,
    domain_context: String,
}

impl Translator {
    pub fn new(dispatcher: ModelDispatcher, config: &TranslationConfig) -> Self {
        Self {
            dispatcher,
            max_attempts: config.max_attempts,
            domain_context: config.domain_context.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.dispatcher.model_name()
    }

    /// Translate every message, preserving order. Attempts run strictly one after another.
    pub async fn translate(&self, req: &TranslationRequest) -> Result<Vec<String>, TranslationError> {
        let expected = req.expected_count();
        if expected == 0 {
            debug!("No messages to translate");
            return Ok(Vec::new());
        }

        info!(
            "Translating {} messages from {} to {}",
            expected, req.source_language, req.language
        );

        let base_prompt = build_prompt(req, &self.domain_context)?;
        let mut state = RetryState::new(base_prompt, expected, self.max_attempts);

        loop {
            let prompt = state.start_attempt();
            debug!("Attempt {} prompt:\n{}", state.attempts(), prompt);

            let raw = match self.dispatcher.invoke(prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    state.fail();
                    error!("Model call failed on attempt {}: {}", state.attempts(), e);
                    return Err(e);
                }
            };
            state.reply_received();
            debug!("Attempt {} raw reply: {}", state.attempts(), raw);

            let parsed = match parse_translations(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    state.fail();
                    error!("Unusable model output on attempt {}: {}", state.attempts(), e);
                    return Err(e);
                }
            };

            match state.validate(parsed) {
                Step::Done(translations) => {
                    debug_assert!(state.phase().is_terminal());
                    info!("Translation succeeded after {} attempt(s)", state.attempts());
                    return Ok(translations);
                }
                Step::Retry { observed } => {
                    warn!(
                        "Attempt {} returned {} translations, expected {}; retrying",
                        state.attempts(),
                        observed,
                        expected
                    );
                }
                Step::Failed(e) => {
                    error!("{} (last output length: {:?})", e, state.last_count());
                    return Err(e);
                }
            }
        }
    }
}
