mod config;
mod error;
mod rate_limit;

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use campus_assistant::CampusAssistant;
use campus_core::{ChatInput, ChatMessage, ChatReply, Course, Enrollment, NewEnrollment};
use campus_observability::{AppMetrics, MetricsSnapshot};
use campus_storage::{sample_courses, seed_catalog, Store};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use crate::config::ApiConfig;
pub use crate::error::ApiError;
use crate::rate_limit::ClientRateLimiter;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<CampusAssistant<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub limiter: ClientRateLimiter,
    pub backend: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    backend: &'static str,
    metrics: MetricsSnapshot,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SessionCreateRequest {
    session_id: String,
    user_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatRequest {
    session_id: String,
    user_message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EnrollmentCreateRequest {
    session_id: String,
    student_email: String,
    student_name: String,
    course_code: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchQuery {
    keyword: String,
}

#[derive(Debug, Clone, Deserialize)]
struct HistoryQuery {
    email: String,
}

/// Opens the configured store, seeds the catalog when asked to, and builds
/// the router.
pub async fn build_app(config: &ApiConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();

    let store = match config.database_url.as_deref() {
        Some(database_url) => Store::sqlite(database_url).await?,
        None => Store::memory(),
    };
    if config.seed_catalog {
        seed_catalog(&store, &sample_courses()).await?;
    }
    let backend = store.backend_name();

    let assistant = Arc::new(CampusAssistant::new(Arc::new(store), metrics.clone()));

    let state = ApiState {
        assistant,
        metrics,
        limiter: ClientRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
        backend,
    };

    Ok(build_router(state, &config.allowed_origins))
}

pub fn build_router(state: ApiState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/session", post(create_session))
        .route("/courses", get(list_courses))
        .route("/courses/search", get(search_courses))
        .route("/chat", post(chat))
        .route("/enroll", post(enroll))
        .route("/enrollments", get(list_enrollments))
        .route("/chat-history", get(chat_history))
        .layer(build_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn home() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Welcome to AI Campus Assistant Chatbot".to_string(),
    })
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        backend: state.backend,
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn create_session(
    State(state): State<ApiState>,
    Json(request): Json<SessionCreateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = state
        .assistant
        .start_session(&request.session_id, request.user_email)
        .await?;

    Ok(Json(MessageResponse {
        message: outcome.message().to_string(),
    }))
}

async fn list_courses(State(state): State<ApiState>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.assistant.list_courses().await?))
}

async fn search_courses(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.assistant.search_catalog(&query.keyword).await?))
}

async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state
        .assistant
        .handle_chat(ChatInput {
            session_id: request.session_id,
            user_message: request.user_message,
        })
        .await?;

    Ok(Json(reply))
}

async fn enroll(
    State(state): State<ApiState>,
    Json(request): Json<EnrollmentCreateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let receipt = state
        .assistant
        .enroll(NewEnrollment {
            session_id: request.session_id,
            student_email: request.student_email,
            student_name: request.student_name,
            course_code: request.course_code,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: receipt.message(),
    }))
}

async fn list_enrollments(
    State(state): State<ApiState>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
    Ok(Json(state.assistant.list_enrollments().await?))
}

async fn chat_history(
    State(state): State<ApiState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    Ok(Json(state.assistant.chat_history(&query.email).await?))
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let client = request_client(&request);
    if !state.limiter.allow(&client) {
        tracing::warn!(client = %client, "rate limited");
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}

fn request_client(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
