use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("upstream rejected authentication: {0}")]
    AuthRejected(String),

    #[error("upstream call failed: {0}")]
    Transport(String),

    #[error("upstream call timed out")]
    Timeout,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
