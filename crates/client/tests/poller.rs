//! Status poller against a scripted project source on a paused clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use saasprobe_client::poller::{self, PollPhase, PollerConfig, ProjectSource};
use saasprobe_client::ApiError;
use saasprobe_core::project::{ProjectStatus, ProjectWithAnalysis, ValidationTask};
use saasprobe_core::types::DbId;

const INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
enum Step {
    Status(&'static str),
    /// Analysis row already attached while the status is not yet final.
    EarlyAnalysis(&'static str),
    Fail,
}

/// Replays `script` one step per fetch, then repeats the last step.
struct ScriptedSource {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Step>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(steps: &[Step]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.iter().copied().collect()),
            last: Mutex::new(Step::Fail),
            calls: AtomicUsize::new(0),
        })
    }

    fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn project(id: DbId, status: &str, with_analysis: bool) -> ProjectWithAnalysis {
    let analysis = with_analysis.then(|| {
        json!({
            "id": 11,
            "project_id": id,
            "overall_score": 84,
            "verdict": "Strong demand",
            "key_insights": ["People ask for this weekly"],
            "recommendations": ["Ship a waitlist"],
            "reddit_data": { "score": 88.4, "summary": "Lots of threads" },
            "created_at": "2024-05-01T12:10:00"
        })
    });
    serde_json::from_value(json!({
        "id": id,
        "name": "Inbox zero bot",
        "status": status,
        "keywords": ["email"],
        "created_at": "2024-05-01T12:00:00",
        "analysis": analysis
    }))
    .unwrap()
}

#[async_trait]
impl ProjectSource for ScriptedSource {
    async fn fetch_project(&self, id: DbId) -> Result<ProjectWithAnalysis, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *last = next;
            }
            *last
        };
        match step {
            Step::Status(status) => Ok(project(id, status, status == "completed")),
            Step::EarlyAnalysis(status) => Ok(project(id, status, true)),
            Step::Fail => Err(ApiError::Decode("connection reset".into())),
        }
    }

    async fn requeue_project(&self, id: DbId) -> Result<ValidationTask, ApiError> {
        Ok(ValidationTask {
            status: "queued".into(),
            task_id: format!("task-{id}"),
            project_id: id,
        })
    }
}

fn config() -> PollerConfig {
    PollerConfig { interval: INTERVAL }
}

#[tokio::test(start_paused = true)]
async fn terminal_status_stops_all_fetches() {
    let source = ScriptedSource::new(&[Step::Status("completed")]);
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();

    rx.wait_for(|s| s.phase == PollPhase::Stopped).await.unwrap();
    assert_eq!(source.calls(), 1);

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(handle.state().phase, PollPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn failed_status_is_terminal_too() {
    let source = ScriptedSource::new(&[Step::Status("pending"), Step::Status("failed")]);
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();

    rx.wait_for(|s| s.phase == PollPhase::Stopped).await.unwrap();
    assert_eq!(handle.state().status(), Some(ProjectStatus::Failed));

    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn analysis_appears_only_once_completed() {
    let source = ScriptedSource::new(&[
        Step::Status("pending"),
        Step::EarlyAnalysis("processing"),
        Step::Status("completed"),
    ]);
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();

    let mut seen = Vec::new();
    loop {
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        let Some(snapshot) = state.snapshot.as_ref() else {
            continue;
        };
        let analysis_shown = snapshot.completed_analysis().is_some();
        if seen.last() != Some(&(snapshot.status(), analysis_shown)) {
            seen.push((snapshot.status(), analysis_shown));
        }
        if state.phase == PollPhase::Stopped {
            break;
        }
    }

    assert_eq!(
        seen,
        [
            (ProjectStatus::Pending, false),
            (ProjectStatus::Processing, false),
            (ProjectStatus::Completed, true),
        ]
    );
    let state = handle.state();
    let analysis = state.snapshot.as_ref().unwrap().completed_analysis().unwrap();
    assert_eq!(analysis.score(), 84);
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn fetches_are_spaced_by_the_interval() {
    let source = ScriptedSource::new(&[Step::Status("pending")]);
    let start = tokio::time::Instant::now();
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();

    rx.wait_for(|s| s.fetch_count == 1).await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);

    rx.wait_for(|s| s.fetch_count == 3).await.unwrap();
    assert_eq!(start.elapsed(), INTERVAL * 2);
    assert_eq!(handle.state().phase, PollPhase::Polling);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_snapshot_and_polling() {
    let source = ScriptedSource::new(&[
        Step::Status("processing"),
        Step::Fail,
        Step::Status("completed"),
    ]);
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();

    let errored = rx
        .wait_for(|s| s.last_error.is_some())
        .await
        .unwrap()
        .clone();
    assert_eq!(errored.phase, PollPhase::Polling);
    assert_eq!(errored.status(), Some(ProjectStatus::Processing));

    let done = rx
        .wait_for(|s| s.phase == PollPhase::Stopped)
        .await
        .unwrap()
        .clone();
    assert_eq!(done.last_error, None);
    assert_eq!(done.status(), Some(ProjectStatus::Completed));
}

#[tokio::test(start_paused = true)]
async fn resume_after_retry_fetches_immediately() {
    let source = ScriptedSource::new(&[Step::Status("failed")]);
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.phase == PollPhase::Stopped).await.unwrap();

    source.push(Step::Status("pending"));
    source.push(Step::Status("completed"));
    let resumed_at = tokio::time::Instant::now();
    handle.resume();

    rx.wait_for(|s| s.status() == Some(ProjectStatus::Pending))
        .await
        .unwrap();
    assert_eq!(resumed_at.elapsed(), Duration::ZERO);

    rx.wait_for(|s| s.phase == PollPhase::Stopped && s.status() == Some(ProjectStatus::Completed))
        .await
        .unwrap();
    assert_eq!(resumed_at.elapsed(), INTERVAL);
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn resume_keeps_polling_through_failures() {
    let source = ScriptedSource::new(&[Step::Status("failed")]);
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.phase == PollPhase::Stopped).await.unwrap();

    source.push(Step::Fail);
    source.push(Step::Status("processing"));
    handle.resume();

    let state = rx
        .wait_for(|s| s.fetch_count == 2)
        .await
        .unwrap()
        .clone();
    assert_eq!(state.phase, PollPhase::Polling);
    assert_eq!(state.status(), Some(ProjectStatus::Failed));

    rx.wait_for(|s| s.status() == Some(ProjectStatus::Processing))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_polling() {
    let source = ScriptedSource::new(&[Step::Status("processing")]);
    let handle = poller::spawn(source.clone(), 1, config());
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.fetch_count == 1).await.unwrap();

    drop(handle);
    rx.wait_for(|s| s.phase == PollPhase::Cancelled).await.unwrap();

    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_the_task() {
    let source = ScriptedSource::new(&[Step::Status("pending")]);
    let handle = poller::spawn(source.clone(), 1, config());
    let rx = handle.subscribe();

    handle.shutdown().await;
    assert_eq!(rx.borrow().phase, PollPhase::Cancelled);
}
