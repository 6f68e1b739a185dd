use serde::{Deserialize, Serialize};

/// Body of `GET /2/tweets/:id`.
///
/// Lookup problems (deleted tweet, protected account) arrive with a 200 status,
/// no `data`, and an `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TweetLookupResponse {
    #[serde(default)]
    pub data: Option<Tweet>,
    #[serde(default)]
    pub errors: Option<Vec<LookupProblem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LookupProblem {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl TweetLookupResponse {
    /// Tweet text, or an empty string when the tweet or its text is missing.
    pub fn text_or_empty(self) -> String {
        self.data.and_then(|t| t.text).unwrap_or_default()
    }
}
