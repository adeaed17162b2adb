use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt::Debug;
use tracing::debug;

use crate::WeatherError;

/// Fetches a URL and decodes its body as JSON.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get_json(&self, url: &str) -> Result<Value, WeatherError>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value, WeatherError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| {
                WeatherError::Upstream(format!("Failed to send request: {}", e.without_url()))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::Upstream(format!("Failed to read response body: {}", e.without_url()))
        })?;

        debug!(%status, bytes = body.len(), "received response");

        if !status.is_success() {
            return Err(WeatherError::Upstream(format!(
                "request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
