//! HTTP surface: the translation page and a small JSON API.

pub mod handlers;
pub mod render;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::controller::Controller;
use crate::error::Result;

/// Shared application state for the HTTP server
pub struct AppState {
    controller: Controller,
    config: Config,
    is_ready: AtomicBool,
}

impl AppState {
    /// Create a new application state with readiness unset
    pub fn new(controller: Controller, config: Config) -> Self {
        Self {
            controller,
            config,
            is_ready: AtomicBool::new(false),
        }
    }

    /// Mark the server as ready to accept requests
    pub fn mark_ready(&self) {
        self.is_ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Build the HTTP router for the service
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::page).post(handlers::page_action))
        .route("/api/translate", post(handlers::api_translate))
        .route("/api/pipelines", get(handlers::api_pipelines))
        .route("/api/pipelines/:direction/reload", post(handlers::api_reload))
        .route("/healthz", get(handlers::health))
        .route("/readyz", get(handlers::readiness))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until a shutdown signal arrives
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = state.config().bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Translation UI listening on http://{}", addr);
    state.mark_ready();

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for a shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::loader::tests::RecordingFactory;
    use crate::loader::PipelineLoader;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn state_with(factory: Arc<RecordingFactory>) -> Arc<AppState> {
        let loader = Arc::new(PipelineLoader::new(factory));
        Arc::new(AppState::new(Controller::new(loader), Config::default()))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_page_renders_labels_for_direction() {
        let app = build_router(state_with(Arc::new(RecordingFactory::default())));

        let response = app
            .oneshot(Request::get("/?direction=en-ar").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Enter English text"));
        assert!(html.contains("Enter text to translate..."));
    }

    #[tokio::test]
    async fn test_form_submit_shows_source_and_translation() {
        let factory = Arc::new(RecordingFactory::default());
        let app = build_router(state_with(Arc::clone(&factory)));

        let response = app
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("direction=ar-en&text=hello&action=translate"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("Translation completed successfully!"));
        assert!(html.contains(r#"<textarea id="original_text" readonly>hello</textarea>"#));
        assert!(html.contains(r#"<textarea id="translated_text" readonly>bonjour</textarea>"#));
        assert!(html.contains("Processing time:"));
        assert_eq!(factory.translate_calls(), 1);
    }

    #[tokio::test]
    async fn test_form_clear_returns_empty_input() {
        let factory = Arc::new(RecordingFactory::default());
        let app = build_router(state_with(Arc::clone(&factory)));

        let response = app
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("direction=ar-en&text=something&action=clear"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains(r#"placeholder="Enter text to translate..."></textarea>"#));
        assert_eq!(factory.translate_calls(), 0);
    }

    #[tokio::test]
    async fn test_switching_direction_keeps_draft() {
        let factory = Arc::new(RecordingFactory::default());
        let app = build_router(state_with(Arc::clone(&factory)));

        let response = app
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("direction=en-ar&tab=translate&text=draft+text&action=select"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("Enter English text"));
        assert!(html.contains(r#"value="en-ar" checked"#));
        assert!(html.contains(r#"placeholder="Enter text to translate...">draft text</textarea>"#));
        assert!(!html.contains("notice warning"));
        assert_eq!(factory.translate_calls(), 0);
        assert_eq!(factory.calls(), vec![
            "create:en-ar",
            "setup_resources:en-ar",
            "load_data:en-ar",
            "load_model:en-ar",
        ]);
    }

    #[tokio::test]
    async fn test_api_translate_rejects_blank_text() {
        let factory = Arc::new(RecordingFactory::default());
        let app = build_router(state_with(Arc::clone(&factory)));

        let response = app
            .oneshot(
                Request::post("/api/translate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"direction":"en-ar","text":"  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(factory.translate_calls(), 0);
    }

    #[tokio::test]
    async fn test_api_translate_returns_all_fields() {
        let app = build_router(state_with(Arc::new(RecordingFactory::default())));

        let response = app
            .oneshot(
                Request::post("/api/translate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"direction":"ar-en","text":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["original"], "hello");
        assert_eq!(body["cleaned"], "hello");
        assert_eq!(body["translated"], "bonjour");
        assert_eq!(body["direction"], "ar-en");
    }

    #[tokio::test]
    async fn test_api_translate_reports_load_failure() {
        let factory = Arc::new(RecordingFactory::default());
        factory.fail_model_loads.store(1, std::sync::atomic::Ordering::SeqCst);
        let app = build_router(state_with(Arc::clone(&factory)));

        let response = app
            .oneshot(
                Request::post("/api/translate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"direction":"ar-en","text":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(factory.translate_calls(), 0);
    }

    #[tokio::test]
    async fn test_reload_rejects_unknown_direction() {
        let app = build_router(state_with(Arc::new(RecordingFactory::default())));

        let response = app
            .oneshot(Request::post("/api/pipelines/fr-en/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_readiness_follows_mark_ready() {
        let state = state_with(Arc::new(RecordingFactory::default()));

        let response = build_router(Arc::clone(&state))
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.mark_ready();
        let response = build_router(state)
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
