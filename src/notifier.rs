// src/notifier.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::TelegramConfig;
use crate::errors::{DeliveryFailure, Result};

/// Delivers text messages to the single configured recipient.
pub trait Notifier: Send + Sync {
    /// Makes one delivery attempt.
    fn send(&self, text: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// Creates a notifier with the configured request timeout.
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DeliveryFailure::Transport(e.without_url()))?;
        Ok(Self { client, config })
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        );

        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            // The request URL carries the bot token.
            .map_err(|e| DeliveryFailure::Transport(e.without_url()))?;

        let status = resp.status();
        let reply: Option<TelegramReply> = resp.json().await.ok();

        match reply {
            Some(TelegramReply { ok: true, .. }) if status.is_success() => {
                log::debug!("Telegram message sent: {}", text);
                Ok(())
            }
            Some(TelegramReply { description, .. }) => Err(DeliveryFailure::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }
            .into()),
            None => Err(DeliveryFailure::Rejected {
                status: status.as_u16(),
                description: "unreadable reply body".to_string(),
            }
            .into()),
        }
    }
}
