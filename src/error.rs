use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Failures of one translation request after the HTTP layer accepted it.
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Model output is not a valid JSON array: {raw}")]
    ModelOutputParse { raw: String },

    #[error("Model output is valid JSON but not an array: {raw}")]
    ModelOutputShape { raw: String },

    #[error("Element at index {index} is not a string: {value}")]
    ModelOutputElementType { index: usize, value: Value },

    #[error("Expected {expected} translations but the model returned {last_len} after {attempts} attempts")]
    RetryBudgetExhausted {
        attempts: u32,
        expected: usize,
        last_len: usize,
    },

    #[error("Model runtime call failed: {0}")]
    ModelRuntime(String),

    #[error("Model call could not be completed: {0}")]
    Dispatch(String),

    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

impl TranslationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TranslationError::ModelOutputElementType { .. } => StatusCode::BAD_REQUEST,
            TranslationError::ModelRuntime(_) => StatusCode::BAD_GATEWAY,
            TranslationError::ModelOutputParse { .. }
            | TranslationError::ModelOutputShape { .. }
            | TranslationError::RetryBudgetExhausted { .. }
            | TranslationError::Dispatch(_)
            | TranslationError::Prompt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TranslationError {
    fn into_response(self) -> Response {
        detail_response(self.status_code(), self.to_string())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("Missing API Key")]
    Missing,

    #[error("Invalid API Key or no credits")]
    Rejected,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        detail_response(StatusCode::UNAUTHORIZED, self.to_string())
    }
}

/// `/generate` body that could not be read as a translation request.
#[derive(Error, Debug)]
#[error("{}", .0.body_text())]
pub struct RequestBodyError(pub JsonRejection);

impl IntoResponse for RequestBodyError {
    fn into_response(self) -> Response {
        detail_response(self.0.status(), self.to_string())
    }
}

fn detail_response(status: StatusCode, detail: String) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}
