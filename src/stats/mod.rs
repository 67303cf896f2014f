//! Best-effort GitHub vanity statistics. Every failure degrades to a fixed
//! fallback; nothing here can fail page rendering.

use serde::Deserialize;

mod cache;
mod github;

pub use cache::*;
pub use github::*;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VanityStats {
    pub contributions: u64,
    pub stars: u64,
    pub repositories: u64,
    pub top_language: String,
}

impl Default for VanityStats {
    fn default() -> Self {
        Self {
            contributions: 847,
            stars: 127,
            repositories: 35,
            top_language: "TypeScript".to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate limited")]
    RateLimited,
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no token configured")]
    NoToken,
    #[error("couldn't start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
