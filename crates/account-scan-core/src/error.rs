use crate::model::UserId;

/// Failure reported by a [SocialGraph](crate::graph::SocialGraph) or
/// [ImageFetcher](crate::graph::ImageFetcher) implementation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Network, TLS or client construction failures
    #[error("Transport error: {0}")]
    Transport(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Invalid relation type: `{0}` (expected `followers` or `friends`)")]
    InvalidRelation(String),

    #[error("Unknown quota category: `{0}`")]
    UnknownCategory(String),

    #[error("No cached record for user {0}")]
    NotFound(UserId),

    #[error("Remote API error: {0}")]
    Remote(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Json error (e.g.: serialization, deserialization, etc.)
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl ScanError {
    /// Whether the error stems from a caller passing an unrecognized name.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidRelation(_) | ScanError::UnknownCategory(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
