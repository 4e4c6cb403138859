use serde::{Deserialize, Serialize};
use anyhow::Result;

/// Default file looked up when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "conf.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub system_config: SystemConfig,
    pub llm_config: LlmConfig,
    pub translation_config: TranslationConfig,
    pub auth_config: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub host: String,
    pub port: u16,
}

/// Which model runtime to talk to and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "ollama_llm" or "openai_compatible_llm"
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub keep_alive: Option<String>,
    /// No timeout unless set; the runtime's own limits apply.
    pub request_timeout_secs: Option<u64>,
    pub max_concurrent_calls: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub max_attempts: u32,
    pub domain_context: String,
}

/// A list rather than a map: the config crate may fold map keys to lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyCredits {
    pub key: String,
    pub credits: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub api_keys: Vec<ApiKeyCredits>,
    pub default_credits: i64,
    /// Grant `default_credits` to keys missing from the table instead of rejecting them.
    pub allow_unknown_keys: bool,
}

fn default_domain_context() -> String {
    "The texts come from SmartLPA, an application used to run layered process audits on industrial plant floors.".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama_llm".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            api_key: None,
            temperature: None,
            keep_alive: None,
            request_timeout_secs: None,
            max_concurrent_calls: 4,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            domain_context: default_domain_context(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            default_credits: 5,
            allow_unknown_keys: false,
        }
    }
}

impl Config {
    /// Layer defaults, an optional config file and `TRANSLATOR_*` environment
    /// variables, then apply the `API_KEY` and `PORT` shortcuts.
    pub fn load(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(false))
            .add_source(
                ::config::Environment::with_prefix("TRANSLATOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.apply_env_shortcuts(
            std::env::var("API_KEY").ok(),
            std::env::var("PORT").ok(),
        )?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_shortcuts(&mut self, api_key: Option<String>, port: Option<String>) -> Result<()> {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            if !self.auth_config.api_keys.iter().any(|k| k.key == key) {
                let credits = self.auth_config.default_credits;
                self.auth_config.api_keys.push(ApiKeyCredits { key, credits });
            }
        }
        if let Some(port) = port {
            self.system_config.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT value {:?}: {}", port, e))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.translation_config.max_attempts == 0 {
            anyhow::bail!("translation_config.max_attempts must be at least 1");
        }
        if self.llm_config.max_concurrent_calls == 0 {
            anyhow::bail!("llm_config.max_concurrent_calls must be at least 1");
        }
        Ok(())
    }
}
