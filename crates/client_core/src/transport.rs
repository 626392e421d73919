//! HTTP transport to the support chat service.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::SessionId,
    error::TransportError,
    protocol::{ChatReply, ChatRequest, ChatResponse, CHAT_PATH},
};
use tracing::debug;
use url::Url;

/// One best-effort request/response round trip per call. Implementations hold no
/// conversation state and never retry.
#[async_trait]
pub trait RemoteChatClient: Send + Sync {
    async fn exchange(&self, session_id: &SessionId, text: &str)
        -> Result<ChatReply, TransportError>;
}

pub struct HttpChatClient {
    http: Client,
    chat_url: Url,
}

impl HttpChatClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            http,
            chat_url: chat_endpoint(base_url)?,
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

/// Resolves the exchange endpoint under `base_url`, keeping any path prefix the
/// base carries (`http://host/api` -> `http://host/api/chat/`).
pub fn chat_endpoint(base_url: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("base url is empty".into()));
    }

    let base = Url::parse(&format!("{trimmed}/")).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
    }

    base.join(CHAT_PATH.trim_start_matches('/'))
        .map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl RemoteChatClient for HttpChatClient {
    async fn exchange(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<ChatReply, TransportError> {
        let res = self
            .http
            .post(self.chat_url.clone())
            .json(&ChatRequest {
                session_id: session_id.clone(),
                message: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let body: ChatResponse =
            serde_json::from_slice(&bytes).map_err(|e| TransportError::Malformed(e.to_string()))?;
        debug!(
            session_id = %session_id,
            escalated = body.escalated,
            session_end = body.session_end,
            "chat service replied"
        );
        Ok(body.into())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
