use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tower_http::cors::CorsLayer;

use crate::analyze::{self, CompletionError, DynCompletionClient};
use crate::cache::ResultCache;
use crate::lexicon::LexiconStore;

#[derive(Clone)]
pub struct AppState {
    pub lexicon: LexiconStore,
    pub cache: Arc<ResultCache>,
    pub client: DynCompletionClient,
}

impl AppState {
    pub fn new(lexicon: LexiconStore, cache: Arc<ResultCache>, client: DynCompletionClient) -> Self {
        Self {
            lexicon,
            cache,
            client,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    #[serde(default)]
    content: String,
    #[serde(default)]
    title: String,
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Response {
    if body.content.trim().is_empty() || body.title.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "content or title empty").into_response();
    }

    match analyze::analyze_content(
        &state.lexicon,
        &state.cache,
        state.client.as_ref(),
        &body.content,
        &body.title,
    )
    .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => completion_error_response(e),
    }
}

/// Error taxonomy to HTTP mapping: configuration -> 500, upstream failure ->
/// forwarded status/body, timeout -> 504 with a distinct retry message,
/// transport -> 502.
fn completion_error_response(err: CompletionError) -> Response {
    match err {
        CompletionError::MissingApiKey => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        CompletionError::Upstream { status, body } => {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (code, body).into_response()
        }
        CompletionError::Timeout => (StatusCode::GATEWAY_TIMEOUT, err.to_string()).into_response(),
        CompletionError::Transport(_) => {
            (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResp {
    status: &'static str,
    timestamp: String,
    has_api_key: bool,
    message: &'static str,
    lexicon_loaded: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let has_api_key = state.client.has_api_key();
    Json(HealthResp {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        has_api_key,
        message: if has_api_key {
            "API key is configured"
        } else {
            "API key is missing - please set OPENAI_API_KEY in environment variables"
        },
        lexicon_loaded: state.lexicon.loaded(),
    })
}
