use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ControlAction, LogBundle, Service, SystemStats};

/// Why a backend call did not produce a usable answer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never completed (connect, DNS, timeout, cancelled)
    #[error("{0}")]
    Transport(String),
    /// The backend answered with a non-success status and a message
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// A success status whose body could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Text shown to the operator when a control action fails.
    pub fn notice_text(&self) -> String {
        match self {
            Self::Transport(detail) => format!("Connection error: {}", detail),
            Self::Rejected { message, .. } => format!("Error: {}", message),
            Self::Malformed(detail) => format!("Error: malformed response: {}", detail),
        }
    }
}

/// The service-control backend the dashboard talks to.
///
/// Implementations:
/// - `HttpBackend`: the JSON HTTP API
/// - `DemoBackend`: an in-process fleet for demos and tests
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn stats(&self) -> Result<SystemStats, ApiError>;

    async fn services(&self) -> Result<Vec<Service>, ApiError>;

    /// Returns the backend's acknowledgement message on success.
    async fn control(&self, name: &str, action: ControlAction) -> Result<String, ApiError>;

    async fn logs(&self, name: &str) -> Result<LogBundle, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        assert_eq!(
            ApiError::Rejected {
                status: 500,
                message: "permission denied".into()
            }
            .notice_text(),
            "Error: permission denied"
        );
        assert_eq!(
            ApiError::Transport("connection refused".into()).notice_text(),
            "Connection error: connection refused"
        );
        assert!(
            ApiError::Malformed("expected value".into())
                .notice_text()
                .starts_with("Error: malformed response")
        );
    }
}
