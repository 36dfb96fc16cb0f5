use account_scan_core::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwitterError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Missing environment variable: {0}")]
    EnvVar(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, TwitterError>;

impl From<TwitterError> for GraphError {
    fn from(error: TwitterError) -> Self {
        match error {
            TwitterError::Api { status, message } => GraphError::Api { status, message },
            TwitterError::Auth(message) => GraphError::Api {
                status: 401,
                message,
            },
            TwitterError::RateLimit => GraphError::RateLimited,
            TwitterError::InvalidResponse(message) => GraphError::InvalidResponse(message),
            TwitterError::Json(e) => GraphError::InvalidResponse(e.to_string()),
            other => GraphError::Transport(Box::new(other)),
        }
    }
}
