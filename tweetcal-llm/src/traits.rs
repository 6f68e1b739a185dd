use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tweetcal_http::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Provider-neutral chat completion request. The model comes from the client.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// One entry per candidate, in provider order. `None` when the candidate
    /// carried no message content.
    pub choices: Vec<Option<String>>,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Http(#[from] HttpError),

    #[error("completion response contained no choices")]
    EmptyResponse,

    #[error("configuration error: {0}")]
    Config(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Issue one chat completion.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Model identifier sent with every request.
    fn model_name(&self) -> &str;

    /// Text of the first candidate; empty when it has no content.
    async fn first_choice_text(&self, request: ChatRequest) -> Result<String, LlmError> {
        let response = self.chat(request).await?;
        match response.choices.into_iter().next() {
            Some(content) => Ok(content.unwrap_or_default()),
            None => Err(LlmError::EmptyResponse),
        }
    }
}
