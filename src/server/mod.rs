//! HTTP boundary: request validation, routing and JSON envelopes.

pub mod error;
pub mod handlers;

use crate::core::error::RelayError;
use crate::dispatch::Dispatcher;
use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub history_limit: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/query_response", post(handlers::query_response))
        .route("/session_history", get(handlers::session_history))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(addr: &str, app: Router) -> Result<(), RelayError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| RelayError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RelayError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::error::MISSING_FIELDS_MESSAGE;
    use super::handlers::HEALTH_MESSAGE;
    use super::*;
    use crate::config::{ModelType, TimeoutConfig};
    use crate::core::error::{ProviderError, StorageError};
    use crate::dispatch::ProviderRegistry;
    use crate::history::{HistoryEntry, HistoryStore, InMemoryHistoryStore, InteractionRecord};
    use crate::providers::LLMProvider;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct EchoProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn generate(&self, query: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {}", query))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LLMProvider for FailingProvider {
        async fn generate(&self, _query: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Api("An internal model error occurred.".to_string()))
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl HistoryStore for BrokenStore {
        async fn append(&self, _record: &InteractionRecord) -> Result<(), StorageError> {
            Err(StorageError::Connection("no reachable servers".to_string()))
        }

        async fn recent(&self, _limit: usize) -> Result<Vec<HistoryEntry>, StorageError> {
            Err(StorageError::Connection("no reachable servers".to_string()))
        }
    }

    struct Harness {
        app: Router,
        store: InMemoryHistoryStore,
        calls: Arc<AtomicUsize>,
    }

    fn harness() -> Harness {
        let store = InMemoryHistoryStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut registry = ProviderRegistry::new();
        registry.register(
            ModelType::OpenAI,
            Arc::new(EchoProvider {
                calls: Arc::clone(&calls),
            }),
        );
        registry.register(ModelType::Gemini, Arc::new(FailingProvider));

        let dispatcher = Dispatcher::new(
            registry,
            Arc::new(store.clone()),
            &TimeoutConfig::default(),
        );
        let app = router(AppState {
            dispatcher,
            history_limit: 10,
        });

        Harness { app, store, calls }
    }

    fn broken_store_app() -> Router {
        let dispatcher = Dispatcher::new(
            ProviderRegistry::new(),
            Arc::new(BrokenStore),
            &TimeoutConfig::default(),
        );
        router(AppState {
            dispatcher,
            history_limit: 10,
        })
    }

    fn post_query(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/query_response")
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn query_response_returns_provider_text() {
        let h = harness();
        let body = json!({ "user_query": "Tell me about testing", "model_type": "OpenAI" });

        let response = h.app.oneshot(post_query(body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "echo: Tell me about testing" })
        );

        let records = h.store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_query, "Tell me about testing");
        assert_eq!(records[0].model_type, ModelType::OpenAI);
    }

    #[tokio::test]
    async fn missing_user_query_is_rejected_before_dispatch() {
        let h = harness();

        let response = h
            .app
            .oneshot(post_query(json!({ "model_type": "OpenAI" }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "message": MISSING_FIELDS_MESSAGE })
        );
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(h.store.records().await.is_empty());
    }

    #[tokio::test]
    async fn missing_or_empty_model_type_is_rejected() {
        for body in [
            json!({ "user_query": "Tell me about testing" }),
            json!({ "user_query": "Tell me about testing", "model_type": "" }),
            json!({ "user_query": null, "model_type": "OpenAI" }),
        ] {
            let h = harness();
            let response = h.app.oneshot(post_query(body.to_string())).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                json_body(response).await,
                json!({ "message": "user_query or model_type is missing" })
            );
            assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn body_without_content_type_is_accepted() {
        let h = harness();
        let request = Request::builder()
            .method("POST")
            .uri("/query_response")
            .body(Body::from(
                json!({ "user_query": "hi", "model_type": "OpenAI" }).to_string(),
            ))
            .unwrap();

        let response = h.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "message": "echo: hi" }));
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_a_bad_request() {
        let h = harness();
        let body = json!({ "user_query": 42, "model_type": "OpenAI" });

        let response = h.app.oneshot(post_query(body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let h = harness();

        let response = h.app.oneshot(post_query("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].is_string());
        assert!(h.store.records().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_model_type_is_a_client_error() {
        let h = harness();
        let body = json!({ "user_query": "Cause an error", "model_type": "ErrorModel" });

        let response = h.app.oneshot(post_query(body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Unknown model type: ErrorModel" })
        );
        assert!(h.store.records().await.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_a_server_error() {
        let h = harness();
        let body = json!({ "user_query": "x", "model_type": "Gemini" });

        let response = h.app.oneshot(post_query(body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("An internal model error occurred."));
        assert!(h.store.records().await.is_empty());
    }

    #[tokio::test]
    async fn provider_without_key_is_a_server_error() {
        let store = InMemoryHistoryStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ProviderRegistry::new();
        registry.register(
            ModelType::OpenAI,
            Arc::new(EchoProvider {
                calls: Arc::clone(&calls),
            }),
        );
        let dispatcher = Dispatcher::new(
            registry,
            Arc::new(store.clone()),
            &TimeoutConfig::default(),
        );
        let app = router(AppState {
            dispatcher,
            history_limit: 10,
        });
        let body = json!({ "user_query": "hi", "model_type": "Gemini" });

        let response = app.oneshot(post_query(body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Authentication failed: GEMINI_API_KEY is not configured" })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn session_history_lists_last_ten_queries_newest_first() {
        let h = harness();
        for i in 0..12 {
            let body = json!({ "user_query": format!("q{}", i), "model_type": "OpenAI" });
            let response = h
                .app
                .clone()
                .oneshot(post_query(body.to_string()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = h.app.oneshot(get("/session_history")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let entries = body["message"].as_array().unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0], json!({ "user_query": "q11" }));
        assert_eq!(entries[9], json!({ "user_query": "q2" }));
        assert!(
            entries
                .iter()
                .all(|e| e.as_object().is_some_and(|o| o.len() == 1))
        );
    }

    #[tokio::test]
    async fn session_history_on_empty_store_is_an_empty_list() {
        let h = harness();

        let response = h.app.oneshot(get("/session_history")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "message": [] }));
    }

    #[tokio::test]
    async fn session_history_storage_failure_is_a_server_error() {
        let response = broken_store_app()
            .oneshot(get("/session_history"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Storage connection error: no reachable servers" })
        );
    }

    #[tokio::test]
    async fn health_is_good_even_when_dependencies_are_down() {
        let response = broken_store_app().oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": HEALTH_MESSAGE })
        );
    }

    #[tokio::test]
    async fn root_greets() {
        let response = harness().app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Hello from genrelay" })
        );
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let request = Request::builder()
            .uri("/health")
            .header("origin", "https://example.com")
            .body(Body::empty())
            .unwrap();

        let response = harness().app.oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
