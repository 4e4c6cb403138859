use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{RequestBodyError, TranslationError};
use crate::state::AppState;
use crate::translation::TranslationRequest;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<TranslationRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("generate", request_id = %request_id);

    // Keys that are not visible ASCII are still keys; they just never match the table.
    let api_key = headers
        .get(API_KEY_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let auth = span.in_scope(|| state.keys.verify(api_key.as_deref()));

    // The key is checked before the body, so a caller without access never learns about the schema.
    let mut response = match (auth, body) {
        (Err(e), _) => e.into_response(),
        (Ok(()), Err(rejection)) => {
            span.in_scope(|| warn!("Rejected request body: {}", rejection.body_text()));
            RequestBodyError(rejection).into_response()
        }
        (Ok(()), Ok(Json(req))) => translate_detached(state, req).instrument(span).await,
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Run the translation on its own task so it finishes even if the client goes away.
async fn translate_detached(state: AppState, req: TranslationRequest) -> Response {
    let span = tracing::Span::current();
    let job = tokio::spawn(
        async move { state.translator.translate(&req).await }.instrument(span),
    );

    match job.await {
        Ok(Ok(translations)) => {
            info!("Returning {} translations", translations.len());
            Json(translations).into_response()
        }
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            error!("Translation task aborted: {}", e);
            TranslationError::Dispatch(e.to_string()).into_response()
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.config.llm_config.provider,
        "model": state.translator.model_name(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}
