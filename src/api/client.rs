use std::time::Duration;

use reqwest::{Client, Response};

use super::{ApiError, ChatReply, ChatRequest, ErrorBody, ProbeReport, Result};

/// HTTP client for the chat endpoint: `GET /test` and `POST /chat`.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Connectivity probe. Any 2xx counts as reachable.
    pub async fn health_check(&self) -> Result<ProbeReport> {
        let url = format!("{}/test", self.base_url);
        tracing::debug!(%url, "probing chat server");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = response.text().await?;
        tracing::info!(%status, body = %body, "connection test");
        Ok(ProbeReport::from_body(&body))
    }

    /// Sends one user message and returns the bot's reply text.
    pub async fn send_message(&self, text: &str) -> Result<String> {
        let url = format!("{}/chat", self.base_url);
        let request = ChatRequest {
            user_message: text.to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = response.text().await?;
        let reply: ChatReply =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        if reply.response.trim().is_empty() {
            return Err(ApiError::Decode("empty reply".to_string()));
        }

        tracing::debug!(%status, chars = reply.response.chars().count(), "chat reply received");
        Ok(reply.response)
    }

    async fn status_error(response: Response) -> ApiError {
        let status = response.status();
        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail_text()),
            Err(e) => {
                tracing::debug!(error = %e, "could not read error body");
                None
            }
        };
        tracing::warn!(%status, ?detail, "chat server returned an error");
        ApiError::Status { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let client = ChatClient::new("http://10.0.2.2:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://10.0.2.2:8000");
    }
}
