use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate))
        .route("/health", get(handlers::health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderValue, Request, StatusCode};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::auth::StaticKeyTable;
    use crate::config::Config;
    use crate::llm::{ChatMessage, ChatModel};
    use crate::translation::engine::tests::ScriptedModel;

    fn app(model: Arc<ScriptedModel>) -> Router {
        let mut keys = HashMap::new();
        keys.insert("valid-key".to_string(), 5);
        keys.insert("empty-key".to_string(), 0);
        let state = AppState::with_parts(
            Config::default(),
            model,
            Arc::new(StaticKeyTable::new(keys, None)),
        );
        create_routes().with_state(state)
    }

    fn generate_request(key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn two_messages() -> Value {
        json!({
            "SourceLanguage": "espanish",
            "language": "english",
            "Messages": [{"message": "Hola, ¿cómo estás?"}, {"message": "Planta"}]
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn generate_returns_translated_array() {
        let model = ScriptedModel::new(&[r#"["Hello, how are you?", "Plant"]"#]);
        let response = app(model.clone())
            .oneshot(generate_request(Some("valid-key"), two_messages()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_json(response).await, json!(["Hello, how are you?", "Plant"]));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn snake_case_body_is_accepted() {
        let model = ScriptedModel::new(&[r#"["Hello"]"#]);
        let body = json!({
            "source_language": "es",
            "language": "en",
            "messages": [{"message": "Hola"}]
        });
        let response = app(model)
            .oneshot(generate_request(Some("valid-key"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_and_exhausted_keys_are_unauthorized() {
        for key in [Some("nope"), Some("empty-key"), None] {
            let model = ScriptedModel::new(&[r#"["a", "b"]"#]);
            let response = app(model.clone())
                .oneshot(generate_request(key, two_messages()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(body_json(response).await["detail"].is_string());
            assert_eq!(model.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn exhausted_retries_are_a_server_error() {
        let model = ScriptedModel::new(&[r#"["only one"]"#]);
        let response = app(model.clone())
            .oneshot(generate_request(Some("valid-key"), two_messages()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("5 attempts"));
        assert!(detail.contains("returned 1"));
        assert_eq!(model.call_count(), 5);
    }

    #[tokio::test]
    async fn non_string_element_is_bad_request() {
        let model = ScriptedModel::new(&[r#"["Hello", {"message": "Plant"}]"#]);
        let response = app(model)
            .oneshot(generate_request(Some("valid-key"), two_messages()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("index 1"));
        assert!(detail.contains("Plant"));
    }

    #[tokio::test]
    async fn unparseable_output_reports_raw_text() {
        let model = ScriptedModel::new(&["Sorry, I can't translate that."]);
        let response = app(model)
            .oneshot(generate_request(Some("valid-key"), two_messages()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("Sorry, I can't translate that."));
    }

    #[tokio::test]
    async fn key_is_checked_before_body() {
        let model = ScriptedModel::new(&["[]"]);
        let response = app(model.clone())
            .oneshot(generate_request(None, json!({"language": "en"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["detail"], "Missing API Key");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_body_gets_detail_json() {
        let model = ScriptedModel::new(&["[]"]);
        let response = app(model.clone())
            .oneshot(generate_request(Some("valid-key"), json!({"language": "en"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("SourceLanguage"));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_json_syntax_gets_detail_json() {
        let model = ScriptedModel::new(&["[]"]);
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .header("x-api-key", "valid-key")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(model).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn non_ascii_key_is_rejected_not_missing() {
        let model = ScriptedModel::new(&["[]"]);
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .header("x-api-key", HeaderValue::from_bytes(&[0xE2, 0x82, 0xAC]).unwrap())
            .body(Body::from(two_messages().to_string()))
            .unwrap();
        let response = app(model).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["detail"], "Invalid API Key or no credits");
    }

    /// Always returns one translation too few, slowly.
    struct SlowShortModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatModel for SlowShortModel {
        async fn chat_completion(&self, _messages: Vec<ChatMessage>) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"["only one"]"#.to_string())
        }

        fn model_name(&self) -> &str {
            "slow-short"
        }
    }

    #[tokio::test]
    async fn client_disconnect_does_not_cancel_retries() {
        let model = Arc::new(SlowShortModel { calls: AtomicUsize::new(0) });
        let state = AppState::with_parts(
            Config::default(),
            model.clone(),
            Arc::new(StaticKeyTable::new(HashMap::from([("valid-key".to_string(), 5)]), None)),
        );
        let router = create_routes().with_state(state);

        // The client gives up long before five 20ms attempts can finish.
        let call = router.oneshot(generate_request(Some("valid-key"), two_messages()));
        assert!(tokio::time::timeout(Duration::from_millis(10), call).await.is_err());
        assert!(model.calls.load(Ordering::SeqCst) < 5);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while model.calls.load(Ordering::SeqCst) < 5 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(model.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn health_reports_model() {
        let model = ScriptedModel::new(&["[]"]);
        let response = app(model)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "scripted");
    }
}
