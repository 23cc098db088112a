use crate::catalog;
use crate::context::AppContext;
use crate::error::{GraphChatError, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Web front-end and JSON API over a shared `AppContext`
pub struct HttpServer {
    context: Arc<AppContext>,
}

impl HttpServer {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let settings = &self.context.config.http_server;
        let addr = format!("{}:{}", settings.host, settings.port);

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            GraphChatError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to bind to {}: {}. Set http_server.port in config.toml or GRAPHCHAT_PORT to use another port.",
                    addr, e
                ),
            ))
        })?;

        log::info!("Starting graphchat web server on http://{}", addr);
        log::info!("Chat endpoint: http://{}/api/chat", addr);

        axum::serve(listener, create_router(Arc::clone(&self.context)))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GraphChatError::Io(std::io::Error::new(std::io::ErrorKind::Other, format!("HTTP server error: {}", e))))?;

        self.context.shutdown();
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

/// State shared across handlers
#[derive(Clone)]
struct AppState {
    context: Arc<AppContext>,
    chat_timeout: Duration,
}

/// Build the axum router
pub fn create_router(context: Arc<AppContext>) -> Router {
    let chat_timeout = Duration::from_secs(context.config.http_server.chat_timeout_secs);
    build_router(AppState { context, chat_timeout })
}

fn build_router(state: AppState) -> Router {
    let allowed_origins = &state.context.config.http_server.allowed_origins;

    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .route("/api/queries", get(handle_queries))
        .route("/api/test-connection", get(handle_test_connection))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// JSON error body with a status code
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<GraphChatError> for ApiError {
    fn from(err: GraphChatError) -> Self {
        let status = match err {
            GraphChatError::Validation(_) => StatusCode::BAD_REQUEST,
            GraphChatError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match err {
            GraphChatError::Validation(msg) => msg,
            other => other.to_string(),
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "graphchat",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> std::result::Result<Response, ApiError> {
    let message = match payload {
        Ok(Json(ChatRequest { message: Some(message) })) if !message.trim().is_empty() => message,
        Ok(_) => return Err(GraphChatError::Validation("Please provide a message".to_string()).into()),
        Err(rejection) => {
            log::debug!("Rejected chat body: {}", rejection);
            return Err(GraphChatError::Validation("Please provide a message".to_string()).into());
        }
    };

    log::info!("Chat request: {}", message);
    match tokio::time::timeout(state.chat_timeout, state.context.agent.chat(&message)).await {
        Ok(result) => Ok(Json(result).into_response()),
        Err(_) => {
            log::warn!("Chat turn timed out after {:?}", state.chat_timeout);
            Err(ApiError {
                status: StatusCode::GATEWAY_TIMEOUT,
                message: format!(
                    "The request took longer than {} seconds. Please try a simpler question.",
                    state.chat_timeout.as_secs()
                ),
            })
        }
    }
}

async fn handle_queries() -> impl IntoResponse {
    Json(catalog::introspection())
}

async fn handle_test_connection(State(state): State<AppState>) -> Response {
    match state.context.graph.echo().await {
        Ok(echo) => Json(json!({
            "status": "success",
            "message": "TigerGraph connection is working",
            "response": echo,
        }))
        .into_response(),
        Err(e) => {
            log::error!("TigerGraph connection test failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": format!("TigerGraph connection failed: {}", e),
                })),
            )
                .into_response()
        }
    }
}
