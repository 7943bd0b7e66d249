use futures_util::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;

/// Any failure of the external generation call.
///
/// The matcher never surfaces these to its caller; they select the fallback
/// path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation service is rate limiting requests")]
    RateLimited,

    #[error("generation service returned HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("generation service returned no text")]
    EmptyResponse,

    #[error("malformed generation reply: {0}")]
    Malformed(String),
}

impl GenerationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        GenerationError::Malformed(reason.into())
    }
}

/// A fully rendered request for the generation service
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// An opaque text generation backend
pub trait Generator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Single attempt; implementations must not retry.
    fn generate<'a>(&'a self, prompt: &'a Prompt) -> BoxFuture<'a, Result<String, GenerationError>>;
}
