use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    routing::{get, post},
};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::{
    assessment::{AssessmentProxy, EntityUpload, read_upload},
    config::AppConfig,
    error::ServiceError,
    health::HealthReport,
    model::{ChatRequest, ChatResponse, ModelRegistry},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: ModelRegistry,
    pub proxy: AssessmentProxy,
}

pub fn build_router(
    config: Arc<AppConfig>,
    registry: ModelRegistry,
    proxy: AssessmentProxy,
) -> Router {
    let body_limit = config.max_body_bytes;
    let state = AppState {
        config,
        registry,
        proxy,
    };

    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/assess", post(assess))
        .route("/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport::snapshot(&state.registry))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServiceError> {
    // Availability is decided before the body is even looked at.
    if !state.registry.is_available() {
        return Err(ServiceError::ClientUnavailable);
    }
    let Json(request) = payload?;

    let reply = state.registry.invoke_chat(&request.conversation).await?;
    Ok(Json(ChatResponse { reply }))
}

async fn assess(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ServiceError> {
    let multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "assessment request is not a multipart upload");
        ServiceError::MissingInput
    })?;

    let bytes = read_upload(multipart).await?;
    let upload = EntityUpload::decode(&bytes)?;
    info!(size_bytes = bytes.len(), "assessment file received");

    let result = state.proxy.proxy_assessment(upload).await?;
    Ok(Json(result))
}
