use thiserror::Error;

/// The single failure kind of a generation call.
///
/// Network failures, non-success statuses and unreadable bodies all land
/// here. The detail string is for logs only; callers never branch on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport error: {detail}")]
pub struct TransportError {
    detail: String,
}

impl TransportError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::new(err.to_string())
    }
}
