//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sunchat_agent::ChatAgent;
use sunchat_core::config::GatewayConfig;
use sunchat_store::ChatStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
pub struct AppState {
    pub store: Arc<ChatStore>,
    pub agent: Arc<ChatAgent>,
}

/// Build the Axum router with all chat/RAG routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/sessions",
            get(super::routes::list_sessions).post(super::routes::create_session),
        )
        .route(
            "/sessions/{session_id}",
            get(super::routes::get_session).delete(super::routes::delete_session),
        )
        .route("/messages", post(super::routes::send_message))
        .route(
            "/documents",
            get(super::routes::list_documents).post(super::routes::create_document),
        )
        .route(
            "/documents/{id}",
            get(super::routes::get_document)
                .put(super::routes::update_document)
                .delete(super::routes::delete_document),
        );

    Router::new()
        .nest("/api/v1/chat", api)
        .route("/health", get(super::routes::health_check))
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any);

            // Restrict CORS origins in production via env var
            // Example: SUNCHAT_CORS_ORIGINS=https://sunshieldsolar.com
            if let Ok(origins_str) = std::env::var("SUNCHAT_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                // Development fallback — allow all origins
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(config: &GatewayConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on http://{addr}");
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use sunchat_core::error::Result;
    use sunchat_core::traits::CompletionProvider;
    use sunchat_core::types::ChatTurn;
    use tower::util::ServiceExt;

    struct CannedProvider(&'static str);

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _turns: &[ChatTurn]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn router() -> (Router, Arc<AppState>) {
        let store = Arc::new(ChatStore::open_in_memory(1000).unwrap());
        let agent = Arc::new(ChatAgent::new(
            store.clone(),
            Arc::new(CannedProvider("Happy to help with your solar questions.")),
            3,
        ));
        let state = Arc::new(AppState { store, agent });
        (build_router(state.clone()), state)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_session_returns_201() {
        let (app, _) = router();
        let resp = app
            .oneshot(json_request("POST", "/api/v1/chat/sessions", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert!(json["sessionId"].as_str().is_some());
        assert!(json["title"].is_null());
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let (app, _) = router();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/chat/sessions/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn message_without_content_is_400_and_persists_nothing() {
        let (app, state) = router();
        let session = state.store.create_session(None).unwrap();

        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/chat/messages",
                serde_json::json!({ "sessionId": session.session_id }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let (_, messages) = state.store.get_session(&session.session_id).unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn message_to_unknown_session_is_404() {
        let (app, _) = router();
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/chat/messages",
                serde_json::json!({ "sessionId": "ghost", "content": "hi" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn send_message_returns_the_assistant_reply() {
        let (app, state) = router();
        let session = state.store.create_session(None).unwrap();

        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/chat/messages",
                serde_json::json!({
                    "sessionId": session.session_id,
                    "content": "What financing options do you offer?",
                    "useRAG": false,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "Happy to help with your solar questions.");
        assert!(json["citedDocuments"].is_null());
    }

    #[tokio::test]
    async fn rag_message_carries_citations() {
        let (app, state) = router();
        let (doc, _) = state
            .store
            .create_document(
                "We offer zero-down financing and PACE financing for qualified properties.",
            )
            .unwrap();
        let session = state.store.create_session(None).unwrap();

        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/chat/messages",
                serde_json::json!({
                    "sessionId": session.session_id,
                    "content": "Tell me about financing",
                    "useRAG": true,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["citedDocuments"], serde_json::json!([doc.id]));
    }

    #[tokio::test]
    async fn document_crud_round_trip() {
        let (app, state) = router();

        // Create
        let resp = build_router(Arc::new(AppState {
            store: state.store.clone(),
            agent: state.agent.clone(),
        }))
        .oneshot(json_request(
            "POST",
            "/api/v1/chat/documents",
            serde_json::json!({ "content": "Coatings reflect heat away from the roof." }),
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["chunkCount"], 1);

        // Get with chunks
        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/chat/documents/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["chunks"].as_array().unwrap().len(), 1);

        // Delete, then 404
        state.store.delete_document(id).unwrap();
        assert!(state.store.get_document(id).is_err());
    }

    #[tokio::test]
    async fn delete_session_then_404() {
        let (app, state) = router();
        let session = state.store.create_session(Some("to-delete")).unwrap();

        let resp = build_router(Arc::new(AppState {
            store: state.store.clone(),
            agent: state.agent.clone(),
        }))
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/chat/sessions/{}", session.session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/chat/sessions/to-delete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
