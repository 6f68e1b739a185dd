//! Social network clients used by tweetcal.
//!
//! Only the Twitter/X single-tweet lookup is implemented.
pub mod twitter;
