//! Small JSON-over-HTTP client shared by the Twitter and OpenAI integrations.
//!
//! - Per-request options: extra headers, [`Auth`], timeout, retry budget
//! - Secrets never reach the logs: auth headers are redacted, only the auth
//!   kind is recorded
//! - Retries are opt-in (the default budget is zero); when enabled, 429/5xx and
//!   transport failures back off exponentially and honor `Retry-After`
//! - `TWEETCAL_HTTP_RAW=1` logs a curl line plus the raw response under the
//!   `http.raw` target
//!
//! ```no_run
//! # async fn demo() -> Result<(), tweetcal_http::HttpError> {
//! let client = tweetcal_http::HttpClient::new("https://api.example.com/v1")?;
//! let got: serde_json::Value = client
//!     .get_json("items", tweetcal_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

const RAW_ENV: &str = "TWEETCAL_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status of an API error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a request authenticates.
///
/// ```
/// use tweetcal_http::Auth;
///
/// let auth = Auth::Bearer("token");
/// assert_eq!(auth.kind(), "bearer");
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`
    Bearer(&'a str),
    None,
}

impl Auth<'_> {
    /// Label used in logs in place of the credential.
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::None => "none",
        }
    }
}

/// Per-request knobs. Unset fields fall back to the client defaults.
///
/// ```
/// use tweetcal_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("demo")),
///     ..Default::default()
/// };
/// assert_eq!(opts.retries, None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to `base`.
    ///
    /// A trailing `/` is added when missing so relative paths are appended to
    /// the base path instead of replacing its last segment.
    ///
    /// ```
    /// use tweetcal_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.openai.com/v1")?;
    /// assert_eq!(client.base().as_str(), "https://api.openai.com/v1/");
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// assert_eq!(client.max_retries, 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(30),
            max_retries: 0,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET `path` relative to the base and decode the JSON body.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json::<(), T>(Method::GET, path, None, opts)
            .await
    }

    /// POST a JSON body to `path` relative to the base and decode the JSON reply.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body), opts)
            .await
    }

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let body_bytes = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::Build(format!("body serialization failed: {e}")))?;
        let auth_header = match &opts.auth {
            Some(Auth::Bearer(token)) => Some((AUTHORIZATION, bearer_header(token)?)),
            Some(Auth::None) | None => None,
        };
        let auth_kind = opts.auth.as_ref().map_or("none", Auth::kind);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let req_id = format!("r{}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));

        let mut attempt = 0usize;
        loop {
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);
            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }
            if let Some((name, value)) = &auth_header {
                rb = rb.header(name, value.clone());
            }
            if let Some(bytes) = &body_bytes {
                rb = rb.header(CONTENT_TYPE, "application/json").body(bytes.clone());
            }

            tracing::debug!(
                req_id=%req_id,
                attempt=attempt + 1,
                max_retries,
                method=%method,
                host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                timeout_ms=timeout.as_millis() as u64,
                auth_kind,
                has_body=%body_bytes.is_some(),
                "http.request.start"
            );
            if raw_enabled() {
                let curl = make_curl(
                    &method,
                    &url,
                    opts.headers.as_ref(),
                    body_bytes.as_deref(),
                );
                tracing::debug!(target: "http.raw", %req_id, %curl, "request");
            }

            let started = Instant::now();
            let sent = match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|b| (status, headers, b))
                }
                Err(err) => Err(err),
            };
            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(req_id=%req_id, attempt, message=%message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };
            let duration_ms = started.elapsed().as_millis() as u64;

            let request_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-transaction-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms,
                body_len=bytes.len(),
                x_request_id=%request_id,
                rate_limit.remaining=?headers.get("x-rate-limit-remaining").and_then(|v| v.to_str().ok()),
                "http.response.headers"
            );
            if raw_enabled() {
                let truncated = bytes.len() > RAW_MAX_BODY;
                let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
                tracing::info!(
                    target: "http.raw",
                    %req_id,
                    %status,
                    duration_ms,
                    headers=?redact_headers(&headers),
                    body=%text,
                    truncated
                );
            }

            let snippet = snip_body(&bytes);
            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        req_id=%req_id,
                        serde_line=%e.line(),
                        serde_col=%e.column(),
                        serde_err=%e,
                        body_snippet=%snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            let message = extract_error_message(&bytes);
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < max_retries {
                attempt += 1;
                let delay = retry_after_secs(&headers)
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| backoff(attempt));
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    message=%message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%message,
                x_request_id=%request_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt.saturating_sub(1)).min(10)))
}

fn retry_after_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

/// Best-effort curl line for reproducing a request. Credentials are never
/// included because only caller-supplied headers are rendered.
fn make_curl(method: &Method, url: &Url, headers: Option<&HeaderMap>, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, value) in headers.map(redact_headers).unwrap_or_default() {
        parts.push(format!("-H '{}: {}'", name, value.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        let shown = &bytes[..bytes.len().min(RAW_MAX_BODY)];
        match std::str::from_utf8(shown) {
            Ok(s) => parts.push(format!("-d '{}'", s.replace('\'', r"'\''"))),
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let secret = key.eq_ignore_ascii_case("authorization")
                || key.eq_ignore_ascii_case("openai-organization");
            let val = if secret {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Pull a human-readable message out of an error body.
///
/// Understands OpenAI (`{"error":{"message":..}}`), Twitter
/// (`{"errors":[{"message"|"detail"|"title":..}]}` or a problem document with
/// `title`/`detail`), and generic `message`/`detail`/`error` bodies. Falls back
/// to a truncated copy of the body.
pub fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct OpenAiEnvelope {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
    }
    #[derive(Deserialize)]
    struct TwitterErrors {
        errors: Vec<Problem>,
    }
    #[derive(Deserialize, Default)]
    struct Problem {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        error: String,
    }

    fn first_non_empty(p: Problem) -> Option<String> {
        [p.message, p.detail, p.title, p.error]
            .into_iter()
            .find(|s| !s.is_empty())
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnvelope>(body) {
        return env.error.message;
    }
    if let Ok(tw) = serde_json::from_slice::<TwitterErrors>(body) {
        if let Some(msg) = tw.errors.into_iter().next().and_then(first_non_empty) {
            return msg;
        }
    }
    if let Ok(p) = serde_json::from_slice::<Problem>(body) {
        if let Some(msg) = first_non_empty(p) {
            return msg;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

/// Normalize a pasted token and build its `Authorization` value.
///
/// Surrounding quotes and all ASCII whitespace are stripped; non-ASCII or
/// control bytes are rejected.
fn bearer_header(raw: &str) -> Result<HeaderValue, HttpError> {
    let mut token = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    token.retain(|ch| !ch.is_ascii_whitespace());

    if token.is_empty() {
        return Err(HttpError::Build("credential is empty".into()));
    }
    if !token.is_ascii() {
        return Err(HttpError::Build("credential contains non-ASCII bytes".into()));
    }
    if token.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "credential contains control characters".into(),
        ));
    }

    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gets_trailing_slash() {
        let client = HttpClient::new("https://api.openai.com/v1").unwrap();
        assert_eq!(
            client.base().join("chat/completions").unwrap().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn base_without_path_is_untouched() {
        let client = HttpClient::new("https://api.twitter.com").unwrap();
        assert_eq!(client.base().as_str(), "https://api.twitter.com/");
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(HttpClient::new("not a url"), Err(HttpError::Url(_))));
    }

    #[test]
    fn bearer_header_strips_quotes_and_whitespace() {
        let v = bearer_header(" \"abc\n def\" ").unwrap();
        assert_eq!(v.to_str().unwrap(), "Bearer abcdef");
        assert!(v.is_sensitive());
    }

    #[test]
    fn bearer_header_rejects_empty_and_non_ascii() {
        assert!(matches!(bearer_header("  "), Err(HttpError::Build(_))));
        assert!(matches!(bearer_header("tökén"), Err(HttpError::Build(_))));
    }

    #[test]
    fn extracts_openai_error_message() {
        let body = br#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(extract_error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn extracts_twitter_error_message() {
        let body = br#"{"errors":[{"title":"Invalid Request","detail":"The `id` query parameter value [abc] is not valid"}]}"#;
        assert_eq!(
            extract_error_message(body),
            "The `id` query parameter value [abc] is not valid"
        );
    }

    #[test]
    fn extracts_problem_document_title() {
        let body = br#"{"title":"Unauthorized","type":"about:blank","status":401}"#;
        assert_eq!(extract_error_message(body), "Unauthorized");
    }

    #[test]
    fn falls_back_to_truncated_body() {
        let body = "x".repeat(SNIPPET_MAX + 20);
        let msg = extract_error_message(body.as_bytes());
        assert!(msg.ends_with("..."));
        assert_eq!(msg.len(), SNIPPET_MAX + 3);
    }

    #[test]
    fn organization_header_is_redacted() {
        let mut h = HeaderMap::new();
        h.insert("openai-organization", HeaderValue::from_static("org-123"));
        h.insert("accept", HeaderValue::from_static("application/json"));
        let redacted = redact_headers(&h);
        assert!(redacted.contains(&("openai-organization".into(), "<redacted>".into())));
        assert!(redacted.contains(&("accept".into(), "application/json".into())));
    }

    #[test]
    fn retry_after_parses_seconds() {
        let mut h = HeaderMap::new();
        h.insert(RETRY_AFTER, HeaderValue::from_static(" 3 "));
        assert_eq!(retry_after_secs(&h), Some(3));
    }
}
