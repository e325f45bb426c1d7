// src/api_client.rs

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::errors::{BotError, Result};

/// Source of homework status payloads.
///
/// Implementations perform exactly one request per call; retrying is left to
/// the polling loop.
pub trait StatusSource: Send + Sync {
    /// Fetches the raw payload for everything updated since `cursor`
    /// (a Unix timestamp).
    fn fetch(&self, cursor: i64) -> impl std::future::Future<Output = Result<Value>> + Send;
}

/// Client for the Practicum homework status API.
pub struct PracticumClient {
    client: Client,
    config: ApiConfig,
}

impl PracticumClient {
    /// Creates a client with the configured request timeout.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BotError::UpstreamUnavailable)?;
        Ok(Self { client, config })
    }
}

impl StatusSource for PracticumClient {
    async fn fetch(&self, cursor: i64) -> Result<Value> {
        log::debug!("Requesting homework statuses from {} since {}", self.config.endpoint, cursor);

        let start = Instant::now();

        let resp = self
            .client
            .get(&self.config.endpoint)
            .header("Authorization", format!("OAuth {}", self.config.token))
            .query(&[("from_date", cursor)])
            .send()
            .await
            .map_err(BotError::UpstreamUnavailable)?;

        let status = resp.status();
        log::debug!(
            "Homework API response status: {} ({}ms)",
            status,
            start.elapsed().as_millis()
        );

        if status != StatusCode::OK {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(BotError::HttpStatusNotOk {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>().await.map_err(BotError::UpstreamUnavailable)
    }
}
