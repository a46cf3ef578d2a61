//! Remote signal controller interface.

use crate::error::{CommandError, FetchError};
use crate::wire;
use crossing::direction::Direction;
use crossing::state::SignalReading;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// The three operations the dashboard needs from a signal controller.
///
/// The poll loop is generic over this trait so it can run against a scripted
/// controller in tests.
pub trait ControllerApi: Send + Sync + 'static {
    /// `GET /get_counts`, validated.
    fn fetch_state(&self) -> impl Future<Output = Result<SignalReading, FetchError>> + Send;

    /// `GET /set_signal/<direction>`.
    fn set_signal(&self, direction: Direction)
        -> impl Future<Output = Result<(), CommandError>> + Send;

    /// `GET /end_override`.
    fn end_override(&self) -> impl Future<Output = Result<(), CommandError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpController {
    client: reqwest::Client,
    base_url: String,
}

impl HttpController {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_command(&self, path: &str) -> Result<(), CommandError> {
        let url = self.url(path);
        debug!(%url, "sending command");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(CommandError::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        // Body is best effort; a failed read still reports the status.
        let body = resp.bytes().await.unwrap_or_default();
        let reply = wire::decode_command_reply(&body);
        Err(CommandError::Rejected {
            status: status.as_u16(),
            message: reply
                .message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
        })
    }
}

impl ControllerApi for HttpController {
    async fn fetch_state(&self) -> Result<SignalReading, FetchError> {
        let resp = self
            .client
            .get(self.url("/get_counts"))
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(FetchError::Transport)?;
        wire::decode_reading(&body)
    }

    async fn set_signal(&self, direction: Direction) -> Result<(), CommandError> {
        self.send_command(&format!("/set_signal/{}", direction.as_str()))
            .await
    }

    async fn end_override(&self) -> Result<(), CommandError> {
        self.send_command("/end_override").await
    }
}
