//! LLM integration for tweetcal.
//!
//! [`traits::LlmClient`] is the provider seam; [`openai::OpenAiClient`] is the
//! only implementation. [`extract::EventExtractor`] owns the event prompt and
//! turns a tweet into the model's raw JSON answer.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tweetcal_llm::extract::EventExtractor;
//! use tweetcal_llm::openai::{OpenAiClient, OpenAiSettings};
//!
//! # async fn demo() -> Result<(), tweetcal_llm::traits::LlmError> {
//! let client = OpenAiClient::new(OpenAiSettings::new("sk-...".to_string()))?;
//! let extractor = EventExtractor::new(Arc::new(client));
//! let json = extractor
//!     .extract("https://twitter.com/u/status/1", "Rust meetup 4/1 19:00")
//!     .await?;
//! println!("{json}");
//! # Ok(()) }
//! ```
pub mod extract;
pub mod openai;
pub mod traits;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
