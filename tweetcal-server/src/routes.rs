use crate::{AppError, EventPipeline};
use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const TWEET_URL_PARAM: &str = "tweetUrl";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EventPipeline>,
}

impl AppState {
    pub fn new(pipeline: EventPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(calendar_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /?tweetUrl=...`: plain-text calendar link.
///
/// Only the first `tweetUrl` counts when the parameter is repeated; an empty
/// first value is treated as missing.
pub async fn calendar_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<String, AppError> {
    let tweet_url = params
        .into_iter()
        .find(|(k, _)| k == TWEET_URL_PARAM)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingTweetUrl)?;

    state.pipeline.run(&tweet_url).await
}

pub async fn health_handler() -> &'static str {
    "ok"
}
