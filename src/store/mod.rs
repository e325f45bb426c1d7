// src/store/mod.rs

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{ErrorRecord, HomeworkStatus, SubmissionState};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Holds the last notified submission and the last reported error across
/// polling cycles.
///
/// Implementations only need single-call atomicity: the polling loop is the
/// sole writer and never overlaps with itself.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// The most recently recorded submission, if any.
    async fn last_submission(&self) -> Result<Option<SubmissionState>>;

    /// The most recently recorded error, if any.
    async fn last_error(&self) -> Result<Option<ErrorRecord>>;

    async fn record_submission(&self, name: &str, status: HomeworkStatus, cursor: i64) -> Result<()>;

    async fn record_error(&self, message: &str) -> Result<()>;
}
