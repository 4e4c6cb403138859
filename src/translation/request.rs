use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageItem {
    pub message: String,
}

/// Body of `POST /generate`.
///
/// Serializes with the wire names (`SourceLanguage`, `language`, `Messages`) and
/// accepts the snake_case field names on input as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    #[serde(rename = "SourceLanguage", alias = "source_language")]
    pub source_language: String,

    /// Target language.
    #[serde(rename = "language")]
    pub language: String,

    #[serde(rename = "Messages", alias = "messages")]
    pub messages: Vec<MessageItem>,
}

impl TranslationRequest {
    pub fn expected_count(&self) -> usize {
        self.messages.len()
    }

    /// Pretty JSON using the wire field names, as embedded into the prompt.
    pub fn to_wire_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
