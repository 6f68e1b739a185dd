//! Event extraction: one prompt, one completion, raw JSON text out.
//!
//! The prompt is the only description of the output schema (`action`, `text`,
//! `details`, `location`, `dates`, `sprop`); date inference and field lengths
//! are left to the model. Its wording must stay as is.
use crate::traits::{ChatMessage, ChatRequest, LlmClient, LlmError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Renders `now` the way a JavaScript `Date` prints itself, e.g.
/// `Mon Oct 19 2026 09:30:00 GMT+0000`.
pub fn format_prompt_date(now: DateTime<Utc>) -> String {
    now.format("%a %b %d %Y %H:%M:%S GMT%z").to_string()
}

/// Build the event-extraction prompt.
pub fn build_event_prompt(now: DateTime<Utc>, tweet_text: &str, tweet_url: &str) -> String {
    format!(
        "\n\
         \tTwitterを元に、イベントをGoogleカレンダーに登録するアプリを作っています。\n\
         \t下記tweetを、下記フォーマットに構造化して、JSONを返してください。\n\
         \t回答はJSONデータのみ返してください。\n\
         \t\n\
         \t## 今日の日付\n\
         \t{now}\n\
         \t## tweet\n\
         \t{tweet_text}\n\
         \t## tweet URL\n\
         \t{tweet_url}\n\
         \t\n\
         \t## フォーマット\n\
         \taction: \"TEMPLATE\"（固定）\n\
         \ttext: 予定のタイトル(件名)（15文字程度）\n\
         \tdetails: tweet本文を入れてください。最終行に1行空けて、tweet URLを追加してください。\n\
         \tlocation: 場所（15文字程度）。\n\
         \tdates: 開始日時と終了日時。年が無い場合は今日の日付を元に、一番近い未来の日時にしてください。日時形式=20210401T093000Z/20210401T100000Z\n\
         \tsprop: URL。複数指定する場合は「sprop=〇〇&sprop=△△」\n\
         \t",
        now = format_prompt_date(now),
    )
}

#[derive(Clone)]
pub struct EventExtractor {
    llm: Arc<dyn LlmClient>,
    temperature: Option<f32>,
}

impl EventExtractor {
    /// Uses the client's configured temperature.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask the model for the event JSON describing `tweet_text`.
    pub async fn extract(&self, tweet_url: &str, tweet_text: &str) -> Result<String, LlmError> {
        self.extract_at(Utc::now(), tweet_url, tweet_text).await
    }

    /// [`EventExtractor::extract`] with an explicit "today".
    pub async fn extract_at(
        &self,
        now: DateTime<Utc>,
        tweet_url: &str,
        tweet_text: &str,
    ) -> Result<String, LlmError> {
        let prompt = build_event_prompt(now, tweet_text, tweet_url);
        tracing::debug!(model = self.llm.model_name(), %prompt, "extract.prompt");

        let request = ChatRequest {
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.temperature,
            max_tokens: None,
        };
        self.llm.first_choice_text(request).await
    }
}
