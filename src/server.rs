//! Web chat UI for the [WorkshopAssistant].
//!
//! The page keeps the chat log on the client and sends it along with every message, so the server only holds
//! the assistant (and, through it, the conversation memory of the default session).

use std::net::SocketAddr;
use std::sync::Arc;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::exemplars::assistant::{ChatTurn, WorkshopAssistant};
use crate::exemplars::knowledge_base::SAMPLE_QUESTIONS;

pub const DEFAULT_ADDR: &str = "0.0.0.0:7860";

const INDEX_HTML: &str = include_str!("server/index.html");

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<WorkshopAssistant>,
}

fn default_use_rag() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default = "default_use_rag")]
    pub use_rag: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// New content of the message box.
    pub message: String,
    pub history: Vec<ChatTurn>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/samples", get(samples))
        .route("/api/chat", post(chat))
        .route("/api/clear", post(clear))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn samples() -> Json<serde_json::Value> {
    Json(json!({ "samples": SAMPLE_QUESTIONS }))
}

async fn chat(State(st): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let (message, history) = st.assistant.submit_message(req.message, req.history, req.use_rag).await;
    Json(ChatResponse { message, history })
}

async fn clear() -> Json<ChatResponse> {
    Json(ChatResponse { message: String::new(), history: Vec::new() })
}

/// Serve the chat UI on `addr` until the process is stopped.
pub async fn serve(assistant: Arc<WorkshopAssistant>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("chat UI listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(AppState { assistant })).await?;
    Ok(())
}
