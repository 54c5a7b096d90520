//! HTTP surface for the bug-report-bot.
//!
//! Exposes the chat endpoint, the session reset endpoint, and the banner and
//! health probes. Request-shape validation happens here (and in the
//! coordinator) before any external call; turn failures map onto the error
//! taxonomy: invalid request → 400, agent unavailable → 502.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::{
    base::types::{ChatRequest, ChatResponse, ResetRequest, ResetResponse, Void},
    interaction::chat_turn::{self, TurnError},
    runtime::Runtime,
};

/// Serve the HTTP API until the process is shut down.
#[instrument(skip_all)]
pub async fn serve(runtime: Runtime) -> Void {
    let addr = runtime.config.listen_address.clone();
    let router = build_router(runtime);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr} ...");

    axum::serve(listener, router).await?;

    Ok(())
}

fn build_router(runtime: Runtime) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/bug-report-chat", post(bug_report_chat))
        .route("/bug-report-chat/reset", post(reset_bug_report_session))
        .with_state(runtime)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Bug report backend is running!",
        "status": "success",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "bug-report-bot",
    }))
}

#[instrument(skip_all)]
async fn bug_report_chat(State(runtime): State<Runtime>, Json(request): Json<ChatRequest>) -> Result<Json<ChatResponse>, TurnError> {
    let response = chat_turn::handle_chat_turn(request, &runtime.sessions, &runtime.llm, &runtime.store, &runtime.tracker, &runtime.config).await?;

    Ok(Json(response))
}

#[instrument(skip_all)]
async fn reset_bug_report_session(State(runtime): State<Runtime>, Json(request): Json<ResetRequest>) -> Result<Json<ResetResponse>, TurnError> {
    chat_turn::handle_reset(&request.session_id, &runtime.sessions).await.map_err(TurnError::Internal)?;

    Ok(Json(ResetResponse { success: true }))
}

impl IntoResponse for TurnError {
    fn into_response(self) -> Response {
        let status = match &self {
            TurnError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            TurnError::AgentUnavailable(_) => StatusCode::BAD_GATEWAY,
            TurnError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("Turn failed: {self}");

        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}
