//! HTTP surface for the debate service.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use orchestration::debate::Article;
use orchestration::{DebateError, DebateService, DebateView};

use crate::prompts::PROMPT_VERSION;

pub type SharedService = Arc<DebateService>;

#[derive(Debug, Deserialize)]
pub struct CreateDebateRequest {
    pub article_title: String,
    pub article_content: String,
    #[serde(default)]
    pub article_source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserInputRequest {
    pub user_input: String,
}

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    /// A collaborator behind the engine kept failing.
    #[error("{0}")]
    BadGateway(String),
}

impl From<DebateError> for ApiError {
    fn from(err: DebateError) -> Self {
        let msg = err.to_string();
        match err {
            DebateError::SessionNotFound(_) => ApiError::NotFound(msg),
            DebateError::InvalidState(_) => ApiError::Conflict(msg),
            DebateError::CollaboratorFailure { .. } => ApiError::BadGateway(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            warn!(%status, error = %message, "Request failed");
        }
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn build_router(service: SharedService) -> Router {
    Router::new()
        .route("/debates", post(create_debate))
        .route("/debates/{id}", get(get_debate))
        .route("/debates/{id}/input", post(submit_input))
        .route("/debates/{id}/cancel", post(cancel_debate))
        .route("/health", get(health_check))
        .with_state(service)
}

async fn create_debate(
    State(service): State<SharedService>,
    payload: Result<Json<CreateDebateRequest>, JsonRejection>,
) -> Result<Json<DebateView>, ApiError> {
    let Json(req) = payload?;
    if req.article_title.trim().is_empty() || req.article_content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "article_title and article_content must not be empty".into(),
        ));
    }

    let mut article = Article::new(req.article_title, req.article_content);
    if let Some(source) = req.article_source.filter(|s| !s.trim().is_empty()) {
        article = article.with_source(source);
    }
    Ok(Json(service.create(article).await?))
}

async fn get_debate(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<DebateView>, ApiError> {
    Ok(Json(service.get(&id).await?))
}

async fn submit_input(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    payload: Result<Json<UserInputRequest>, JsonRejection>,
) -> Result<Json<DebateView>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(service.submit_input(&id, &req.user_input).await?))
}

async fn cancel_debate(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<DebateView>, ApiError> {
    Ok(Json(service.cancel(&id).await?))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "prompt_version": PROMPT_VERSION,
    }))
}

// ── Serve ─────────────────────────────────────────────────────────────

pub async fn run_server(service: SharedService, bind: &str, cors: bool) -> Result<()> {
    let mut app = build_router(service);
    if cors {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    info!(addr = %listener.local_addr()?, cors, "Debate service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
