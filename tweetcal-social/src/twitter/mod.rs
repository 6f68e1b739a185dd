//! Twitter/X integration: tweet-ID extraction, the v2 lookup client, and the
//! [`TweetSource`] seam the request handler depends on.
pub mod client;
pub mod types;

pub use client::{TweetSource, TwitterApi, DEFAULT_TWITTER_ENDPOINT};

use thiserror::Error;
use tweetcal_http::HttpError;
use url::Url;

#[derive(Debug, Error)]
pub enum TweetError {
    #[error("invalid tweet URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("twitter request failed: {0}")]
    Http(#[from] HttpError),
}

/// Extract the tweet ID from a status URL: the last path segment.
///
/// Query strings and fragments are ignored. An unparsable URL, or one whose
/// last segment is empty, is rejected.
///
/// ```
/// use tweetcal_social::twitter::tweet_id_from_url;
///
/// assert_eq!(tweet_id_from_url("https://twitter.com/u/status/12345").unwrap(), "12345");
/// assert_eq!(tweet_id_from_url("https://x.com/u/status/9?s=20").unwrap(), "9");
/// ```
pub fn tweet_id_from_url(raw: &str) -> Result<String, TweetError> {
    let invalid = |reason: String| TweetError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    if last.is_empty() {
        return Err(invalid("no trailing path segment".into()));
    }
    Ok(last.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_last_path_segment() {
        assert_eq!(
            tweet_id_from_url("https://twitter.com/u/status/12345").unwrap(),
            "12345"
        );
    }

    #[test]
    fn query_and_fragment_are_ignored() {
        assert_eq!(
            tweet_id_from_url("https://x.com/someone/status/1650000000000000000?s=20&t=abc#frag")
                .unwrap(),
            "1650000000000000000"
        );
    }

    #[test]
    fn non_numeric_segment_is_passed_through() {
        // The lookup API decides what a valid ID is.
        assert_eq!(
            tweet_id_from_url("https://twitter.com/u/status/photo").unwrap(),
            "photo"
        );
    }

    #[test]
    fn trailing_slash_is_rejected() {
        assert!(matches!(
            tweet_id_from_url("https://twitter.com/u/status/"),
            Err(TweetError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = tweet_id_from_url("not a url").unwrap_err();
        assert!(matches!(err, TweetError::InvalidUrl { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        assert!(tweet_id_from_url("mailto:someone@example.com").is_err());
    }
}
