//! Shared plumbing for the tweetcal workspace.
//!
//! Only observability lives here today: every binary and integration test
//! goes through [`observability::init_logging`] so log output lands in one
//! place with one filter.
//!
//! ```no_run
//! use tweetcal_common::observability::{init_logging, LogConfig};
//!
//! let path = init_logging(LogConfig {
//!     emit_stderr: true,
//!     ..LogConfig::default()
//! })
//! .expect("logging");
//! println!("logging to {}", path.display());
//! ```
pub mod observability;
