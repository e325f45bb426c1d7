// src/poller.rs
use std::future::Future;
use std::sync::Arc;

use crate::api_client::StatusSource;
use crate::config::PollerSettings;
use crate::errors::{BotError, Result};
use crate::formatter::parse_status;
use crate::models::SubmissionState;
use crate::notifier::Notifier;
use crate::store::StateStore;
use crate::validator::{check_response, server_cursor};

/// What a single polling cycle decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The API reported no homework updates.
    NoNewWork,
    /// The latest homework matches what the user was last told.
    Unchanged,
    /// The user was notified and the new state recorded.
    Notified(SubmissionState),
    /// A new error was reported to the user (delivery is best-effort).
    ErrorReported(String),
    /// The error repeats the last reported one and was only logged.
    ErrorSuppressed(String),
}

/// Polls the homework API, notifies about status changes and reports
/// failures once per distinct diagnostic.
pub struct PollingLoop<S, N> {
    source: S,
    notifier: N,
    store: Arc<dyn StateStore>,
    settings: PollerSettings,
}

impl<S: StatusSource, N: Notifier> PollingLoop<S, N> {
    pub fn new(source: S, notifier: N, store: Arc<dyn StateStore>, settings: PollerSettings) -> Self {
        Self {
            source,
            notifier,
            store,
            settings,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Runs cycles until `shutdown` resolves. Shutdown is only observed while
    /// sleeping between cycles, never in the middle of one.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log::info!(
            "Polling homework statuses every {}s",
            self.settings.retry_period.as_secs()
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, stopping the polling loop");
                    break;
                }
                _ = tokio::time::sleep(self.settings.retry_period) => {}
            }
        }
    }

    /// Runs one fetch-validate-notify cycle. Never fails: every error is
    /// turned into a diagnostic and handled here.
    pub async fn run_cycle(&self) -> CycleOutcome {
        match self.check_for_updates().await {
            Ok(outcome) => outcome,
            Err(error) => self.handle_error(error).await,
        }
    }

    fn fallback_cursor(&self) -> i64 {
        let period = i64::try_from(self.settings.retry_period.as_secs()).unwrap_or(i64::MAX);
        chrono::Utc::now().timestamp().saturating_sub(period)
    }

    async fn check_for_updates(&self) -> Result<CycleOutcome> {
        let last = self.store.last_submission().await?;
        let cursor = match &last {
            Some(state) => state.cursor,
            None => {
                log::debug!("No submission recorded yet, starting from one period ago");
                self.fallback_cursor()
            }
        };

        let response = self.source.fetch(cursor).await?;
        let homeworks = check_response(&response)?;

        let Some(homework) = homeworks.first() else {
            log::debug!("No new homework to check yet");
            return Ok(CycleOutcome::NoNewWork);
        };

        if last.as_ref().is_some_and(|state| homework.matches(state)) {
            log::debug!("Homework review status has not changed");
            return Ok(CycleOutcome::Unchanged);
        }

        let message = parse_status(homework, &self.settings.verdicts)?;
        let (name, status) = homework.name_and_status()?;
        // Read before sending so a notification is never left without a state advance.
        let next_cursor = server_cursor(&response)?;

        self.notifier.send(&message).await?;
        self.store.record_submission(name, status, next_cursor).await?;
        log::info!("Reported status \"{}\" for homework \"{}\"", status, name);

        Ok(CycleOutcome::Notified(SubmissionState {
            name: name.to_string(),
            status,
            cursor: next_cursor,
        }))
    }

    async fn handle_error(&self, error: BotError) -> CycleOutcome {
        let message = format!("Program failure: {}", error);
        log::error!("{}", message);

        let last_reported = match self.store.last_error().await {
            Ok(record) => record.map(|r| r.message),
            Err(e) => {
                log::error!("Could not read the last reported error: {}", e);
                None
            }
        };

        if last_reported.as_deref() == Some(message.as_str()) {
            log::debug!("Error already reported, not notifying again");
            return CycleOutcome::ErrorSuppressed(message);
        }

        if let Err(e) = self.notifier.send(&message).await {
            log::error!("Failed to report the error to the user: {}", e);
        }
        if let Err(e) = self.store.record_error(&message).await {
            log::error!("Failed to record the reported error: {}", e);
        }

        CycleOutcome::ErrorReported(message)
    }
}
