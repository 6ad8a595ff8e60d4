//! Status poller for a single project.
//!
//! Spawns a task that fetches the project immediately and then every
//! [`PollerConfig::interval`] while its status is non-terminal. Once
//! `completed` or `failed` is observed the task stops issuing requests and
//! waits for [`PollerHandle::resume`] (after a retry) or teardown. State is
//! published through a [`watch`] channel so a view can re-render on every
//! change.
//!
//! Dropping the [`PollerHandle`] cancels the task, including a fetch that
//! is still in flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use saasprobe_core::project::{ProjectStatus, ProjectWithAnalysis, ValidationTask};
use saasprobe_core::types::DbId;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::SaasApi;
use crate::config::{ClientConfig, DEFAULT_POLL_INTERVAL_SECS};
use crate::error::ApiError;

/// Where the poller reads project snapshots from, and where a watching
/// view re-queues a failed validation.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn fetch_project(&self, id: DbId) -> Result<ProjectWithAnalysis, ApiError>;

    async fn requeue_project(&self, id: DbId) -> Result<ValidationTask, ApiError>;
}

#[async_trait]
impl ProjectSource for SaasApi {
    async fn fetch_project(&self, id: DbId) -> Result<ProjectWithAnalysis, ApiError> {
        self.get_project(id).await
    }

    async fn requeue_project(&self, id: DbId) -> Result<ValidationTask, ApiError> {
        self.retry_validation(id).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl From<&ClientConfig> for PollerConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// No fetch has completed yet.
    #[default]
    Idle,
    /// Status is non-terminal (or unknown); the timer is running.
    Polling,
    /// A terminal status was observed; no requests until resumed.
    Stopped,
    /// Torn down.
    Cancelled,
}

/// Everything a project view needs to render.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    pub phase: PollPhase,
    /// Last successfully fetched project.
    pub snapshot: Option<ProjectWithAnalysis>,
    /// Message of the most recent failed fetch, cleared by a success.
    pub last_error: Option<String>,
    /// Number of completed fetch attempts, successful or not.
    pub fetch_count: u64,
}

impl PollState {
    pub fn status(&self) -> Option<ProjectStatus> {
        self.snapshot.as_ref().map(ProjectWithAnalysis::status)
    }

    /// An unknown status counts as non-terminal.
    pub fn should_poll(&self) -> bool {
        !self.status().is_some_and(|s| s.is_terminal())
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owner of a running poller. Dropping it tears the poller down.
pub struct PollerHandle {
    cancel: CancellationToken,
    resume: Arc<Notify>,
    state_rx: watch::Receiver<PollState>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Current state snapshot.
    pub fn state(&self) -> PollState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_rx.clone()
    }

    /// Fetch immediately and resume the interval. Used after a retry.
    pub fn resume(&self) {
        self.resume.notify_one();
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Status poller task failed");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start polling `project_id`. The first fetch happens immediately.
pub fn spawn(
    source: Arc<dyn ProjectSource>,
    project_id: DbId,
    config: PollerConfig,
) -> PollerHandle {
    let cancel = CancellationToken::new();
    let resume = Arc::new(Notify::new());
    let (state_tx, state_rx) = watch::channel(PollState::default());

    let task = tokio::spawn(run(
        source,
        project_id,
        config,
        state_tx,
        cancel.clone(),
        Arc::clone(&resume),
    ));

    PollerHandle {
        cancel,
        resume,
        state_rx,
        task: Some(task),
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

async fn run(
    source: Arc<dyn ProjectSource>,
    project_id: DbId,
    config: PollerConfig,
    state_tx: watch::Sender<PollState>,
    cancel: CancellationToken,
    resume: Arc<Notify>,
) {
    let period = config.interval;
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(project_id, interval_secs = period.as_secs(), "Status poller started");

    let mut fetch_now = true;
    // Set by a resume; keeps the timer running through failed fetches until
    // a fresh snapshot replaces the stale terminal one.
    let mut resumed = false;

    loop {
        if fetch_now {
            fetch_now = false;
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = source.fetch_project(project_id) => result,
            };
            if result.is_ok() {
                resumed = false;
            }
            record(&state_tx, project_id, result, resumed);
            interval.reset();
        }

        let phase = state_tx.borrow().phase;
        if phase == PollPhase::Polling {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => fetch_now = true,
                _ = resume.notified() => {
                    resumed = true;
                    fetch_now = true;
                }
            }
        } else {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = resume.notified() => {
                    tracing::debug!(project_id, "Status poller resumed");
                    resumed = true;
                    fetch_now = true;
                }
            }
        }
    }

    state_tx.send_modify(|state| state.phase = PollPhase::Cancelled);
    tracing::debug!(project_id, "Status poller cancelled");
}

/// Apply one fetch result and decide the next phase in a single update.
fn record(
    state_tx: &watch::Sender<PollState>,
    project_id: DbId,
    result: Result<ProjectWithAnalysis, ApiError>,
    resumed: bool,
) {
    state_tx.send_modify(|state| {
        state.fetch_count += 1;
        match result {
            Ok(project) => {
                state.snapshot = Some(project);
                state.last_error = None;
            }
            Err(e) => {
                tracing::warn!(project_id, error = %e, "Status poll failed");
                state.last_error = Some(e.to_string());
            }
        }

        state.phase = if resumed || state.should_poll() {
            PollPhase::Polling
        } else {
            tracing::debug!(project_id, status = ?state.status(), "Terminal status, polling stopped");
            PollPhase::Stopped
        };
    });
}
