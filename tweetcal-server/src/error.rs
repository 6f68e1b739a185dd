use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tweetcal_calendar::CalendarError;
use tweetcal_llm::traits::LlmError;
use tweetcal_social::twitter::TweetError;

/// Every way a calendar request can fail, one variant per stage.
///
/// Callers only ever see the short message from [`AppError::public_message`];
/// the full error goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("tweetUrl query parameter is missing")]
    MissingTweetUrl,
    #[error(transparent)]
    InvalidTweetUrl(TweetError),
    #[error(transparent)]
    TweetFetch(TweetError),
    #[error(transparent)]
    Completion(#[from] LlmError),
    #[error(transparent)]
    EventParse(#[from] CalendarError),
}

impl From<TweetError> for AppError {
    fn from(err: TweetError) -> Self {
        match err {
            TweetError::InvalidUrl { .. } => AppError::InvalidTweetUrl(err),
            TweetError::Http(_) => AppError::TweetFetch(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingTweetUrl | AppError::InvalidTweetUrl(_) => StatusCode::BAD_REQUEST,
            AppError::TweetFetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Completion(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EventParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::MissingTweetUrl => "error: tweetUrl required.",
            AppError::InvalidTweetUrl(_) => "error: tweetUrl is not a valid tweet URL.",
            AppError::TweetFetch(_) => "error: failed to fetch tweet.",
            AppError::Completion(_) => "error: event extraction failed.",
            AppError::EventParse(_) => "error: could not build calendar URL.",
        }
    }

    /// Status returned by Twitter or OpenAI, when the failure was theirs.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            AppError::TweetFetch(TweetError::Http(e)) => e.status(),
            AppError::Completion(LlmError::Http(e)) => e.status(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let upstream = self.upstream_status().map(|s| s.as_u16());
            tracing::error!(%status, ?upstream, error = %self, "request.failed");
        } else {
            tracing::warn!(%status, error = %self, "request.rejected");
        }
        (status, self.public_message()).into_response()
    }
}
