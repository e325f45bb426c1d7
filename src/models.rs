// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::BotError;

/// Review status reported by the homework API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(BotError::UnknownStatus(other.to_string())),
        }
    }
}

/// The most recently notified submission and the cursor to resume polling from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionState {
    pub name: String,
    pub status: HomeworkStatus,
    pub cursor: i64,
}

/// The last error that was surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    pub created_on: DateTime<Utc>,
}

/// One element of the `homeworks` array. Fields are kept raw so that
/// missing names and unknown statuses can be reported precisely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HomeworkRecord {
    #[serde(default)]
    pub homework_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl HomeworkRecord {
    pub fn new(name: &str, status: &str) -> Self {
        Self {
            homework_name: Some(name.to_string()),
            status: Some(status.to_string()),
        }
    }

    /// The record's name and parsed status.
    ///
    /// The name is checked before the status, so a record missing both reports
    /// `MissingName`.
    pub fn name_and_status(&self) -> Result<(&str, HomeworkStatus), BotError> {
        let name = self.homework_name.as_deref().ok_or(BotError::MissingName)?;
        let status = self
            .status
            .as_deref()
            .ok_or_else(|| BotError::UnknownStatus("<missing>".to_string()))?
            .parse::<HomeworkStatus>()?;
        Ok((name, status))
    }

    /// Whether this record describes the same submission in the same status
    /// as the last one the user was told about.
    pub fn matches(&self, last: &SubmissionState) -> bool {
        self.homework_name.as_deref() == Some(last.name.as_str())
            && self.status.as_deref() == Some(last.status.as_str())
    }
}
