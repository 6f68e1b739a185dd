//! Thin wrapper around the Twitter/X v2 single-tweet lookup.
//!
//! One request per call unless retries are configured. Lookup problems reported inside a 200
//! response are logged and produce an empty text rather than an error.
use super::TweetError;
use super::types::TweetLookupResponse;
use async_trait::async_trait;
use std::time::Duration;
use tweetcal_http::{Auth, HttpClient, RequestOpts};

pub const DEFAULT_TWITTER_ENDPOINT: &str = "https://api.twitter.com";

/// Anything that can turn a tweet ID into its text.
#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Text of tweet `id`; empty when the tweet has no text.
    async fn tweet_text(&self, id: &str) -> Result<String, TweetError>;
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    /// Client against `endpoint` (normally [`DEFAULT_TWITTER_ENDPOINT`]).
    pub fn new(bearer_token: String, endpoint: &str) -> Result<Self, TweetError> {
        let http = HttpClient::new(endpoint)?;
        Ok(Self {
            http,
            bearer: bearer_token,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.http = self.http.with_retries(retries);
        self
    }

    /// Raw lookup response for tweet `id`.
    pub async fn lookup(&self, id: &str) -> Result<TweetLookupResponse, TweetError> {
        let resp: TweetLookupResponse = self
            .http
            .get_json(
                &format!("2/tweets/{id}"),
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    ..Default::default()
                },
            )
            .await?;

        if let Some(errors) = &resp.errors {
            for problem in errors {
                tracing::warn!(
                    tweet_id = %id,
                    title = ?problem.title,
                    detail = ?problem.detail,
                    "twitter.lookup.problem"
                );
            }
        }
        Ok(resp)
    }
}

#[async_trait]
impl TweetSource for TwitterApi {
    async fn tweet_text(&self, id: &str) -> Result<String, TweetError> {
        let text = self.lookup(id).await?.text_or_empty();
        tracing::debug!(tweet_id = %id, text_len = text.len(), "twitter.lookup.done");
        Ok(text)
    }
}
