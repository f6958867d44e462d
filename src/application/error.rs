// Errors raised while talking to the measurement backend
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the connection dropped.
    #[error("network failure: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// Backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was valid JSON but not the expected sequence or wrapper.
    #[error("unexpected response shape: {0}")]
    ShapeMismatch(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::ShapeMismatch(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl FetchError {
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, FetchError::ShapeMismatch(_))
    }
}
