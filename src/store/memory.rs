// src/store/memory.rs

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::errors::Result;
use crate::models::{ErrorRecord, HomeworkStatus, SubmissionState};
use crate::store::StateStore;

#[derive(Default)]
struct Inner {
    submission: Option<SubmissionState>,
    error: Option<ErrorRecord>,
}

/// Volatile store; state is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn last_submission(&self) -> Result<Option<SubmissionState>> {
        Ok(self.lock().submission.clone())
    }

    async fn last_error(&self) -> Result<Option<ErrorRecord>> {
        Ok(self.lock().error.clone())
    }

    async fn record_submission(&self, name: &str, status: HomeworkStatus, cursor: i64) -> Result<()> {
        self.lock().submission = Some(SubmissionState {
            name: name.to_string(),
            status,
            cursor,
        });
        Ok(())
    }

    async fn record_error(&self, message: &str) -> Result<()> {
        self.lock().error = Some(ErrorRecord {
            message: message.to_string(),
            created_on: chrono::Utc::now(),
        });
        Ok(())
    }
}
