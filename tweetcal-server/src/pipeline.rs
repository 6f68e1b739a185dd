use crate::AppError;
use std::sync::Arc;
use tweetcal_calendar::calendar_url;
use tweetcal_llm::extract::EventExtractor;
use tweetcal_social::twitter::{TweetSource, tweet_id_from_url};

/// Tweet lookup, then event extraction, then link building. Each stage feeds
/// the next, so they run strictly in order.
#[derive(Clone)]
pub struct EventPipeline {
    tweets: Arc<dyn TweetSource>,
    extractor: EventExtractor,
}

impl EventPipeline {
    pub fn new(tweets: Arc<dyn TweetSource>, extractor: EventExtractor) -> Self {
        Self { tweets, extractor }
    }

    pub async fn run(&self, tweet_url: &str) -> Result<String, AppError> {
        let tweet_id = tweet_id_from_url(tweet_url)?;

        let text = self.tweets.tweet_text(&tweet_id).await?;
        tracing::info!(%tweet_id, %text, "pipeline.tweet_text");

        let event_json = self.extractor.extract(tweet_url, &text).await?;
        tracing::info!(%tweet_id, %event_json, "pipeline.event_json");

        let url = calendar_url(&event_json)?;
        tracing::info!(%tweet_id, %url, "pipeline.calendar_url");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io;
    use std::sync::Mutex;
    use tweetcal_llm::traits::{ChatRequest, ChatResponse, LlmClient, LlmError};
    use tweetcal_social::twitter::TweetError;

    struct OneTweet;

    #[async_trait]
    impl TweetSource for OneTweet {
        async fn tweet_text(&self, _id: &str) -> Result<String, TweetError> {
            Ok("勉強会 at noon".to_string())
        }
    }

    struct OneAnswer;

    #[async_trait]
    impl LlmClient for OneAnswer {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, LlmError> {
            Ok(ChatResponse {
                choices: vec![Some(r#"{"action":"TEMPLATE","text":"Study"}"#.to_string())],
                ..Default::default()
            })
        }

        fn model_name(&self) -> &str {
            "one-answer"
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn logs_each_stage_result() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let pipeline = EventPipeline::new(
            Arc::new(OneTweet),
            EventExtractor::new(Arc::new(OneAnswer)),
        );
        let url = pipeline
            .run("https://twitter.com/u/status/42")
            .await
            .unwrap();
        assert_eq!(
            url,
            "http://www.google.com/calendar/event?action=TEMPLATE&text=Study"
        );

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let line = |event: &str| {
            logs.lines()
                .find(|l| l.contains(event))
                .unwrap_or_else(|| panic!("no {event} in:\n{logs}"))
                .to_string()
        };

        let text = line("pipeline.tweet_text");
        assert!(text.contains("tweet_id=42"), "{text}");
        assert!(text.contains("text=勉強会 at noon"), "{text}");

        let json = line("pipeline.event_json");
        assert!(json.contains(r#"event_json={"action":"TEMPLATE","text":"Study"}"#), "{json}");

        let link = line("pipeline.calendar_url");
        assert!(link.contains(&format!("url={url}")), "{link}");
    }
}
