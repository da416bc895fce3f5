/// Recommendation data sources
///
/// The pipeline only needs the raw response body; decoding and ranking happen
/// downstream so every source is held to the same validation rules.
use crate::error::AppResult;

pub mod http;

pub use http::HttpSource;

/// Trait for remote recommendation sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Issues a single request and returns the raw response body
    ///
    /// Transport failures and empty bodies are errors. A body received with an
    /// unsuccessful status is still returned for decoding.
    async fn fetch(&self) -> AppResult<Vec<u8>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
