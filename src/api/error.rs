use reqwest::StatusCode;
use thiserror::Error;

/// Alert text for a failed send when the server gave no `detail`.
pub const GENERIC_SEND_FAILURE: &str = "Failed to send message. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// What the user sees: the server's `detail` when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_SEND_FAILURE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_wins_over_generic_text() {
        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            detail: Some("Failed to communicate with Ollama service".into()),
        };
        assert_eq!(err.user_message(), "Failed to communicate with Ollama service");
        assert_eq!(err.to_string(), "server returned 502 Bad Gateway");
    }

    #[test]
    fn missing_detail_falls_back() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        };
        assert_eq!(err.user_message(), GENERIC_SEND_FAILURE);
        assert_eq!(ApiError::Decode("eof".into()).user_message(), GENERIC_SEND_FAILURE);
    }
}
