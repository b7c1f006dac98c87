use serde::{Deserialize, Serialize};

pub use client::ChatClient;
pub use error::{ApiError, Result, GENERIC_SEND_FAILURE};

mod client;
mod error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Body of a non-2xx answer. FastAPI-style servers put a string in `detail`;
/// anything else there is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// What `GET /test` told us. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub status: Option<String>,
    pub message: Option<String>,
    pub detail: Option<String>,
    pub body: serde_json::Value,
}

impl ProbeReport {
    pub fn from_body(text: &str) -> Self {
        let body = serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string()));
        let field = |name: &str| body.get(name).and_then(|v| v.as_str()).map(str::to_string);

        Self {
            status: field("status"),
            message: field("message"),
            detail: field("detail"),
            body,
        }
    }

    /// The server answered but says its model backend is unreachable.
    pub fn is_degraded(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    pub fn summary(&self) -> String {
        match (&self.message, self.is_degraded()) {
            (Some(message), _) => message.clone(),
            (None, true) => "server reachable, model unavailable".to_string(),
            (None, false) => "server reachable".to_string(),
        }
    }
}
