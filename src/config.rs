// src/config.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{BotError, Result};
use crate::models::HomeworkStatus;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Upper bound for the polling interval and request timeout (one week).
pub const MAX_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;

/// Environment variables that must be present before the bot starts.
pub const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Configuration for the homework API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    pub token: String,
    pub timeout: Duration,
}

/// Configuration for the Telegram notifier.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

/// Where the last known state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Sqlite { path: PathBuf },
    Memory,
}

/// Verdict text shown to the user for each review status.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Verdicts {
    pub approved: String,
    pub reviewing: String,
    pub rejected: String,
}

impl Default for Verdicts {
    fn default() -> Self {
        Self {
            approved: "Reviewed: the reviewer liked everything. Hooray!".to_string(),
            reviewing: "The reviewer has taken the work for review.".to_string(),
            rejected: "Reviewed: the reviewer has some remarks.".to_string(),
        }
    }
}

impl Verdicts {
    pub fn verdict(&self, status: HomeworkStatus) -> &str {
        match status {
            HomeworkStatus::Approved => &self.approved,
            HomeworkStatus::Reviewing => &self.reviewing,
            HomeworkStatus::Rejected => &self.rejected,
        }
    }
}

/// Immutable settings handed to the polling loop.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub retry_period: Duration,
    pub verdicts: Verdicts,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            retry_period: Duration::from_secs(600),
            verdicts: Verdicts::default(),
        }
    }
}

/// Non-secret settings that may be read from a TOML file.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub telegram_api_base: String,
    pub retry_period_secs: u64,
    pub request_timeout_secs: u64,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub verdicts: Verdicts,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sqlite,
    Memory,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            retry_period_secs: 600,
            request_timeout_secs: 30,
            storage: StorageKind::Sqlite,
            database_url: None,
            verdicts: Verdicts::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

/// Everything the binary needs to start polling.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub api: ApiConfig,
    pub telegram: TelegramConfig,
    pub poller: PollerSettings,
    pub storage: StorageConfig,
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Missing or empty credentials are reported together, before anything
    /// else is read.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(BotError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let settings = match get("HOMEWORK_BOT_SETTINGS") {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if settings.retry_period_secs == 0 || settings.retry_period_secs > MAX_PERIOD_SECS {
            return Err(BotError::Config(format!(
                "retry_period_secs must be between 1 and {}",
                MAX_PERIOD_SECS
            )));
        }
        if settings.request_timeout_secs == 0 || settings.request_timeout_secs > MAX_PERIOD_SECS {
            return Err(BotError::Config(format!(
                "request_timeout_secs must be between 1 and {}",
                MAX_PERIOD_SECS
            )));
        }

        let storage = match settings.storage {
            StorageKind::Memory => StorageConfig::Memory,
            StorageKind::Sqlite => {
                let path = match get("DATABASE_URL").or(settings.database_url.clone()) {
                    Some(url) => sqlite_path(&url)?,
                    None => default_db_path(),
                };
                StorageConfig::Sqlite { path }
            }
        };

        Ok(BotConfig {
            api: ApiConfig {
                endpoint: settings.endpoint,
                token: get("PRACTICUM_TOKEN").unwrap_or_default(),
                timeout: Duration::from_secs(settings.request_timeout_secs),
            },
            telegram: TelegramConfig {
                api_base: settings.telegram_api_base,
                bot_token: get("TELEGRAM_TOKEN").unwrap_or_default(),
                chat_id: get("TELEGRAM_CHAT_ID").unwrap_or_default(),
                timeout: Duration::from_secs(settings.request_timeout_secs),
            },
            poller: PollerSettings {
                retry_period: Duration::from_secs(settings.retry_period_secs),
                verdicts: settings.verdicts,
            },
            storage,
        })
    }
}

fn sqlite_path(url: &str) -> Result<PathBuf> {
    let path = url.strip_prefix("sqlite:").ok_or_else(|| {
        BotError::Config("DATABASE_URL must start with 'sqlite:'".to_string())
    })?;
    Ok(PathBuf::from(path.trim_start_matches("//")))
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homework-status-bot")
        .join("bot.db")
}
