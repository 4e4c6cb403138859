use std::collections::HashMap;
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Read-only credit lookup for API keys.
pub trait KeyLookup: Send + Sync {
    /// Remaining credits for `key`, or `None` if the key is unknown.
    fn credits(&self, key: &str) -> Option<i64>;

    /// Credits assumed for keys the table does not know. `None` rejects them.
    fn unknown_key_credits(&self) -> Option<i64> {
        None
    }

    fn verify(&self, key: Option<&str>) -> Result<(), AuthError> {
        // A missing header is looked up like any key the table does not know.
        let credits = match key {
            Some(k) => self.credits(k).or_else(|| self.unknown_key_credits()),
            None => self.unknown_key_credits(),
        };
        match (credits, key) {
            (Some(c), _) if c > 0 => Ok(()),
            (_, None) => {
                warn!("Rejected request without API key");
                Err(AuthError::Missing)
            }
            _ => {
                warn!("Rejected API key (credits: {:?})", credits);
                Err(AuthError::Rejected)
            }
        }
    }
}

/// Key table built once at startup and never written afterwards.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyTable {
    keys: HashMap<String, i64>,
    unknown_key_credits: Option<i64>,
}

impl StaticKeyTable {
    pub fn new(keys: HashMap<String, i64>, unknown_key_credits: Option<i64>) -> Self {
        Self {
            keys,
            unknown_key_credits,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let unknown = config
            .allow_unknown_keys
            .then_some(config.default_credits);
        let keys = config
            .api_keys
            .iter()
            .map(|entry| (entry.key.clone(), entry.credits))
            .collect();
        Self::new(keys, unknown)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl KeyLookup for StaticKeyTable {
    fn credits(&self, key: &str) -> Option<i64> {
        self.keys.get(key).copied()
    }

    fn unknown_key_credits(&self) -> Option<i64> {
        self.unknown_key_credits
    }
}
