// src/errors.rs
use thiserror::Error;

/// Shape violations found while validating the upstream payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedResponse {
    #[error("expected a JSON object at the top level, got {found}")]
    NotAMapping { found: &'static str },

    #[error("key \"{0}\" is missing from the response")]
    MissingKey(&'static str),

    #[error("\"{key}\" should be {expected}, got {found}")]
    WrongValueType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Reasons the messaging channel refused a message.
#[derive(Error, Debug)]
pub enum DeliveryFailure {
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("Telegram answered with status {status}: {description}")]
    Rejected { status: u16, description: String },
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML settings: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Request to the homework API failed: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),

    #[error("Homework API answered with status {status}: {body}")]
    HttpStatusNotOk { status: u16, body: String },

    #[error("Malformed homework API response: {0}")]
    MalformedResponse(#[from] MalformedResponse),

    #[error("\"{0}\" is not a recognised homework status")]
    UnknownStatus(String),

    #[error("Homework record has no name")]
    MissingName,

    #[error("Failed to send Telegram message: {0}")]
    NotificationDelivery(#[from] DeliveryFailure),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, BotError>;
