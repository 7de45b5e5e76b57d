use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;

use svcdeck_core::backend::{ApiError, Backend};
use svcdeck_core::model::{ControlAction, LogBundle, Service, SystemStats};

/// Body shape of control acknowledgements and of error replies.
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LogsBody {
    logs: String,
}

#[derive(Debug, Serialize)]
struct ControlRequest {
    action: ControlAction,
}

/// Service-control API reached over HTTP.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;
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

    fn service_url(&self, name: &str, tail: &str) -> String {
        format!(
            "{}/api/services/{}/{}",
            self.base_url,
            urlencoding::encode(name),
            tail
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await.map_err(transport)?;
        read_json(resp).await
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport("request timed out".into())
    } else {
        ApiError::Transport(e.to_string())
    }
}

/// Decode a 2xx body as `T`; anything else becomes a rejection carrying the
/// server's `message` when it sent one, or the status text otherwise.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(transport)?;

    if status.is_success() {
        return serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed(e.to_string()));
    }

    let message = serde_json::from_slice::<MessageBody>(&bytes)
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        });
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn stats(&self) -> Result<SystemStats, ApiError> {
        self.get_json(self.url("/api/stats")).await
    }

    async fn services(&self) -> Result<Vec<Service>, ApiError> {
        self.get_json(self.url("/api/services")).await
    }

    async fn control(&self, name: &str, action: ControlAction) -> Result<String, ApiError> {
        let url = self.service_url(name, "control");
        debug!(%url, %action, "POST");
        let resp = self
            .client
            .post(&url)
            .json(&ControlRequest { action })
            .send()
            .await
            .map_err(transport)?;
        let body: MessageBody = read_json(resp).await?;
        Ok(body.message)
    }

    async fn logs(&self, name: &str) -> Result<LogBundle, ApiError> {
        let body: LogsBody = self.get_json(self.service_url(name, "logs")).await?;
        Ok(LogBundle {
            service_name: name.to_string(),
            text: body.logs,
        })
    }
}
