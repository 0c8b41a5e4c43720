// Error types for lptools.
// Underlying failures pass through unmodified so callers see the original kind.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LptoolsError {
    #[error("Launchpad API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: Launchpad rejected the stored credentials")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("OAuth token exchange failed: {0}")]
    TokenExchange(String),

    #[error("No user cache directory could be resolved")]
    NoCacheHome,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LptoolsError>;
