//! Async HTTP transport for the chat backend.
//!
//! [`ChatClient`] performs exactly one round trip per call — no retries,
//! no queueing. Failure classification is the caller's interface:
//! [`ClientError::Status`] carries the HTTP code for non-2xx responses,
//! [`ClientError::Transport`] covers connect/timeout/IO failures, and
//! [`ClientError::Decode`] covers bodies that don't match the contract.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::wire::{ChatReply, ChatRequest, HealthReply};

/// Errors surfaced by [`ChatClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Async HTTP client for the chat backend.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a new client for the backend at `base_url`.
    ///
    /// `timeout` bounds the whole round trip, connect included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent("kiosk/0.1")
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The backend base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat message and return the parsed reply.
    pub async fn send(&self, message: &str) -> Result<ChatReply, ClientError> {
        let url = format!("{}/chat", self.base_url);
        let body = ChatRequest::new(message);

        debug!(
            "chat request: {} chars to {}",
            message.chars().count(),
            url
        );
        let started = Instant::now();

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| map_transport_error(err, &url))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|err| ClientError::Transport(format!("failed to read response: {err}")))?;

        debug!(
            "chat response: HTTP {} in {:.1}s ({} bytes)",
            status,
            started.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        serde_json::from_str(&text).map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// Probe the backend's health endpoint.
    pub async fn health(&self) -> Result<HealthReply, ClientError> {
        let url = format!("{}/health", self.base_url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| map_transport_error(err, &url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        resp.json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }
}

fn map_transport_error(err: reqwest::Error, url: &str) -> ClientError {
    if err.is_connect() {
        return ClientError::Transport(format!(
            "unable to reach the chat backend at '{url}'. Is the server running?"
        ));
    }

    if err.is_timeout() {
        return ClientError::Transport(format!("request to '{url}' timed out"));
    }

    ClientError::Transport(err.to_string())
}
