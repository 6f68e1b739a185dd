//! HTTP front end: `GET /?tweetUrl=...` answers with a Google Calendar link.
//!
//! The handler runs [`pipeline::EventPipeline`] (tweet lookup, event
//! extraction, link building) and maps each stage's failure to its own status
//! through [`error::AppError`].
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod shutdown;
pub mod startup;

pub use error::AppError;
pub use pipeline::EventPipeline;
pub use routes::{AppState, router};
