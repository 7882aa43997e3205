//! HTTP gateway to the chat backend: send chat message, request upgrade, health check.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ServerSection;
use crate::messages::{ChatQuery, ChatReply, HealthReply, UpgradeReply, UpgradeRequest};

/// Gateway failure. No variant is retried.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request could not reach or complete against the backend.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// The body was not JSON or lacked an expected field.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The two account-facing calls the widget makes, plus a health check.
///
/// Implemented by [`GatewayClient`] over HTTP; tests substitute their own.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send_chat_message(
        &self,
        text: &str,
        user_id: &str,
        premium: bool,
    ) -> Result<ChatReply, GatewayError>;

    async fn request_upgrade(&self, user_id: &str) -> Result<UpgradeReply, GatewayError>;

    async fn health(&self) -> Result<HealthReply, GatewayError>;
}

/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    chat_url: String,
    upgrade_url: String,
    health_url: String,
}

impl GatewayClient {
    /// Build a client for the backend at `base_url` with the default endpoint paths.
    pub fn new(base_url: &str) -> Self {
        Self::from_server(&ServerSection {
            base_url: Some(base_url.to_string()),
            ..ServerSection::default()
        })
    }

    pub fn from_server(server: &ServerSection) -> Self {
        let base = server.base_url().trim_end_matches('/');
        Self {
            http: reqwest::Client::new(),
            chat_url: join_url(base, server.chat_path()),
            upgrade_url: join_url(base, server.upgrade_path()),
            health_url: join_url(base, server.health_path()),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Check the status, then parse the body as JSON of type `T`.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GatewayError::Status { status, body });
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl Backend for GatewayClient {
    async fn send_chat_message(
        &self,
        text: &str,
        user_id: &str,
        premium: bool,
    ) -> Result<ChatReply, GatewayError> {
        debug!(url = %self.chat_url, user_id, premium, "sending chat message");
        let response = self
            .http
            .get(&self.chat_url)
            .query(&ChatQuery::new(text, user_id, premium))
            .send()
            .await?;
        read_json(response).await
    }

    async fn request_upgrade(&self, user_id: &str) -> Result<UpgradeReply, GatewayError> {
        debug!(url = %self.upgrade_url, user_id, "requesting upgrade");
        let response = self
            .http
            .post(&self.upgrade_url)
            .json(&UpgradeRequest { user_id })
            .send()
            .await?;
        read_json(response).await
    }

    async fn health(&self) -> Result<HealthReply, GatewayError> {
        debug!(url = %self.health_url, "checking backend health");
        let response = self.http.get(&self.health_url).send().await?;
        read_json(response).await
    }
}
