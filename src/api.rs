// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::aggregator::rss::RssFeedProvider;
use crate::aggregator::types::FeedProvider;
use crate::augment::client::GenerationClient;
use crate::augment::merge::NewsItem;
use crate::config::DigestConfig;
use crate::pipeline::{self, PipelineError};

#[derive(Clone)]
pub struct AppState {
    config: Arc<DigestConfig>,
    providers: Arc<Vec<Box<dyn FeedProvider>>>,
    generator: Arc<dyn GenerationClient>,
}

impl AppState {
    /// Production wiring: one RSS provider per configured feed.
    pub fn new(config: Arc<DigestConfig>, generator: Arc<dyn GenerationClient>) -> Self {
        let providers = Arc::new(RssFeedProvider::build_all(&config.feeds));
        Self {
            config,
            providers,
            generator,
        }
    }

    /// Wiring seam for tests: substitute feed providers directly.
    pub fn with_providers(
        config: Arc<DigestConfig>,
        providers: Vec<Box<dyn FeedProvider>>,
        generator: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            config,
            providers: Arc::new(providers),
            generator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(get_news))
        .with_state(state)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::very_permissive())
}

#[derive(serde::Serialize)]
struct NewsResponse {
    news: Vec<NewsItem>,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

async fn get_news(State(state): State<AppState>) -> Response {
    match pipeline::run(&state.providers, state.generator.as_ref(), &state.config).await {
        Ok(news) => (StatusCode::OK, Json(NewsResponse { news })).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Every pipeline failure becomes a structured JSON body; nothing escapes to
/// the transport layer unconverted.
fn error_response(e: PipelineError) -> (StatusCode, Json<ErrorBody>) {
    let (status, error, details, retryable) = match e {
        PipelineError::MissingApiKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "GEMINI_API_KEYが設定されていません。".to_string(),
            None,
            None,
        ),
        PipelineError::NoCandidates => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "最新のニュースを取得できませんでした。しばらくしてからもう一度お試しください。".to_string(),
            None,
            None,
        ),
        PipelineError::UnparsableResponse { snippet } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "AIからの応答を解析できませんでした".to_string(),
            Some(snippet),
            None,
        ),
        PipelineError::Overloaded { attempts, last } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "AIサービスが混雑しています。しばらくしてからもう一度お試しください。".to_string(),
            Some(format!("still overloaded after {attempts} attempts: {last}")),
            Some(true),
        ),
        PipelineError::Generation(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "生成に失敗しました".to_string(),
            Some(err.to_string()),
            None,
        ),
    };
    (
        status,
        Json(ErrorBody {
            error,
            details,
            retryable,
        }),
    )
}
