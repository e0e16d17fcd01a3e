use crate::agent::StrategyAgent;
use crate::models::chat::ChatMessage;
use crate::session::SubmitError;

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ rejection::JsonRejection, State },
    response::IntoResponse,
    http::StatusCode,
};
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Deserialize)]
pub struct StrategyRequest {
    pub text: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct TrendsResponse {
    summary: String,
}

#[derive(Serialize)]
struct ReloadResponse {
    success: bool,
    message: String,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<StrategyAgent>,
}

pub fn router(agent: Arc<StrategyAgent>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/strategy", post(strategy_handler))
        .route("/api/trends", get(trends_handler))
        .route("/api/reload-prompts", get(reload_prompts_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

pub async fn start_http_server(
    http_port: u16,
    agent: Arc<StrategyAgent>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", http_port).parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = router(agent);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            error!("HTTP server error: {}", e);
        }
    });

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "service": "strategy-lab" }))
}

/// Stateless single exchange: the caller keeps its own transcript.
async fn strategy_handler(
    State(state): State<AppState>,
    payload: Result<Json<StrategyRequest>, JsonRejection>
) -> axum::response::Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let body = ErrorBody { error: rejection.body_text() };
            return (rejection.status(), Json(body)).into_response();
        }
    };

    if req.text.trim().is_empty() {
        let body = ErrorBody { error: SubmitError::EmptyInput.to_string() };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let message: ChatMessage = state.agent.service().await.query(&req.text).await;
    (StatusCode::OK, Json(message)).into_response()
}

async fn trends_handler(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.agent.service().await.trend_summary().await;
    Json(TrendsResponse { summary })
}

async fn reload_prompts_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (code, body) = match state.agent.reload_prompts_if_changed().await {
        Ok(true) => (StatusCode::OK, ReloadResponse { success: true, message: "Prompts reloaded".into() }),
        Ok(false) => (StatusCode::OK, ReloadResponse { success: true, message: "Prompts unchanged".into() }),
        Err(e) => {
            error!("Prompt reload failed: {}", e);
            (StatusCode::BAD_REQUEST, ReloadResponse { success: false, message: e.to_string() })
        }
    };
    (code, Json(body))
}
