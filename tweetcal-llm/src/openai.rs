use crate::traits::{ChatMessage, ChatRequest, ChatResponse, LlmClient, LlmError};
use crate::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, DEFAULT_TEMPERATURE};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tweetcal_http::{Auth, HttpClient, RequestOpts};

const ORGANIZATION_HEADER: &str = "openai-organization";

/// Everything needed to talk to the chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    /// Sent as `OpenAI-Organization` when present.
    pub organization: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub retries: usize,
}

impl OpenAiSettings {
    /// Defaults: `gpt-3.5-turbo`, temperature 0.7, public endpoint, no retries.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            organization: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            timeout: None,
            retries: 0,
        }
    }
}

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
    temperature: f32,
    extra_headers: HeaderMap,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::Config("OpenAI API key is empty".into()));
        }

        let mut client = HttpClient::new(&settings.endpoint)?.with_retries(settings.retries);
        if let Some(timeout) = settings.timeout {
            client = client.with_timeout(timeout);
        }

        let mut extra_headers = HeaderMap::new();
        if let Some(org) = settings.organization.as_deref().map(str::trim) {
            if !org.is_empty() {
                let mut value = HeaderValue::from_str(org).map_err(|e| {
                    LlmError::Config(format!("invalid OpenAI organization header: {e}"))
                })?;
                value.set_sensitive(true);
                extra_headers.insert(HeaderName::from_static(ORGANIZATION_HEADER), value);
            }
        }

        Ok(Self {
            client,
            api_key: settings.api_key,
            model: settings.model,
            temperature: settings.temperature,
            extra_headers,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            temperature: request.temperature.unwrap_or(self.temperature),
            messages: &request.messages,
            max_tokens: request.max_tokens,
        };

        let resp: ChatCompletionResponse = self
            .client
            .post_json(
                "chat/completions",
                &body,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    headers: Some(self.extra_headers.clone()),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            completion_id = ?resp.id,
            model = ?resp.model,
            choices = resp.choices.len(),
            finish_reason = ?resp.choices.first().and_then(|c| c.finish_reason.as_deref()),
            "openai.chat.done"
        );

        Ok(ChatResponse {
            choices: resp
                .choices
                .into_iter()
                .map(|c| c.message.and_then(|m| m.content))
                .collect(),
            model: resp.model,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
