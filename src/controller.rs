//! Submit a download job, then poll its status until the backend reports a
//! terminal state.
//!
//! The network side of one submission runs as a single tokio task which
//! reports back over a channel. All state lives here and is only touched from
//! the UI thread through [`DownloadController::pump`].

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};

use crate::{
    api::BackendApi,
    error::ApiError,
    model::{DownloadRequest, DownloadStatus, TaskHandle, TaskState},
    opener::FileOpener,
    snackbar::Snackbar,
};

pub const EMPTY_URL_MESSAGE: &str = "Please enter a YouTube URL";
pub const SUBMIT_FAILED_MESSAGE: &str = "Download request failed";
pub const STATUS_FAILED_MESSAGE: &str = "Failed to fetch the download status";
pub const BACKEND_ERROR_FALLBACK: &str = "An error occurred during the download";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Polling)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("{}", EMPTY_URL_MESSAGE)]
    EmptyUrl,
    #[error("a download is already in progress")]
    Busy,
}

#[derive(Debug)]
enum CycleEvent {
    Accepted(TaskHandle),
    SubmitFailed(ApiError),
    Status(TaskHandle, DownloadStatus),
    PollFailed(TaskHandle, ApiError),
}

/// Event stamped with the submission it belongs to
#[derive(Debug)]
struct Tagged {
    ticket: u64,
    event: CycleEvent,
}

pub struct DownloadController {
    /// Backend the polling task talks to
    api: Arc<dyn BackendApi>,
    /// Receives the file URL once a task completes
    opener: Arc<dyn FileOpener>,
    /// Runtime the per-submission tasks are spawned on
    runtime: Handle,
    /// Delay between two status polls of one task
    poll_interval: Duration,
    phase: Phase,
    /// Drives the disabled form and the spinner
    loading: bool,
    /// Last status body, replaced as a whole on every poll
    status: Option<DownloadStatus>,
    /// Backend id of the task being polled
    task: Option<TaskHandle>,
    /// Bumped on every accepted submission; older events are dropped
    ticket: u64,
    /// Cloned into each polling task
    events_tx: UnboundedSender<Tagged>,
    /// Drained on the UI thread
    events_rx: UnboundedReceiver<Tagged>,
}

impl DownloadController {
    pub fn new(
        api: Arc<dyn BackendApi>,
        opener: Arc<dyn FileOpener>,
        runtime: Handle,
        poll_interval: Duration,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            api,
            opener,
            runtime,
            poll_interval,
            phase: Phase::Idle,
            loading: false,
            status: None,
            task: None,
            ticket: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Latest status reported by the backend, exactly as received
    pub fn status(&self) -> Option<&DownloadStatus> {
        self.status.as_ref()
    }

    pub fn task(&self) -> Option<&TaskHandle> {
        self.task.as_ref()
    }

    /// Inline error text for a backend-reported failure
    pub fn backend_error(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|s| s.state == TaskState::Error)
            .map(|s| s.error.as_deref().filter(|e| !e.is_empty()).unwrap_or(BACKEND_ERROR_FALLBACK))
    }

    /// Starts a new submission. An empty URL only raises a warning.
    pub fn submit(&mut self, request: DownloadRequest, snackbar: &mut Snackbar) -> Result<(), SubmitRejected> {
        if request.url.trim().is_empty() {
            snackbar.warning(EMPTY_URL_MESSAGE);
            return Err(SubmitRejected::EmptyUrl);
        }
        if self.phase.is_busy() {
            tracing::warn!("submit ignored, {:?} in progress", self.phase);
            return Err(SubmitRejected::Busy);
        }

        // new ticket first, so anything still queued from before is ignored
        self.ticket += 1;
        self.phase = Phase::Submitting;
        self.loading = true;
        self.status = None;
        self.task = None;
        tracing::info!(ticket = self.ticket, url = %request.url, format = %request.format, "submitting download");

        self.runtime.spawn(run_cycle(
            Arc::clone(&self.api),
            request,
            self.poll_interval,
            self.ticket,
            self.events_tx.clone(),
        ));
        Ok(())
    }

    /// Applies every event that has already arrived. Never blocks.
    pub fn pump(&mut self, snackbar: &mut Snackbar) -> usize {
        let mut applied = 0;
        while let Ok(tagged) = self.events_rx.try_recv() {
            self.apply(tagged, snackbar);
            applied += 1;
        }
        applied
    }

    /// Waits for the next event of the running submission and applies it.
    /// Returns `None` when nothing is running.
    #[cfg(test)]
    pub async fn step(&mut self, snackbar: &mut Snackbar) -> Option<Phase> {
        if !self.phase.is_busy() {
            return None;
        }
        let tagged = self.events_rx.recv().await?;
        self.apply(tagged, snackbar);
        Some(self.phase)
    }

    fn apply(&mut self, tagged: Tagged, snackbar: &mut Snackbar) {
        // stale submission
        if tagged.ticket != self.ticket {
            tracing::debug!(ticket = tagged.ticket, "dropping event from an earlier submission");
            return;
        }

        match tagged.event {
            CycleEvent::Accepted(task) => {
                if self.phase != Phase::Submitting {
                    return;
                }
                tracing::info!(%task, "task accepted, polling");
                self.task = Some(task);
                self.phase = Phase::Polling;
            }
            CycleEvent::SubmitFailed(err) => {
                if self.phase != Phase::Submitting {
                    return;
                }
                tracing::error!("download request failed: {}", err);
                snackbar.error(user_message(&err, SUBMIT_FAILED_MESSAGE));
                self.finish(Phase::Failed);
            }
            CycleEvent::Status(task, status) => {
                if !self.is_current(&task) {
                    tracing::debug!(%task, "dropping status for a stale task");
                    return;
                }
                let state = status.state;
                // wholesale replace, never merge with the previous body
                self.status = Some(status);
                match state {
                    // next poll is already scheduled by the task
                    TaskState::Processing => {}
                    TaskState::Completed => {
                        tracing::info!(%task, "download completed");
                        self.finish(Phase::Completed);
                        // a failed open does not undo the completion
                        let url = self.api.file_url(&task);
                        if let Err(e) = self.opener.open(&url) {
                            tracing::error!("failed to open {}: {}", url, e);
                            snackbar.error(format!("Could not open {url}: {e}"));
                        }
                    }
                    TaskState::Error => {
                        tracing::warn!(%task, "backend reported an error: {:?}", self.backend_error());
                        self.finish(Phase::Failed);
                    }
                }
            }
            CycleEvent::PollFailed(task, err) => {
                if !self.is_current(&task) {
                    return;
                }
                tracing::error!(%task, "status poll failed: {}", err);
                snackbar.error(user_message(&err, STATUS_FAILED_MESSAGE));
                self.finish(Phase::Failed);
            }
        }
    }

    fn is_current(&self, task: &TaskHandle) -> bool {
        self.phase == Phase::Polling && self.task.as_ref() == Some(task)
    }

    fn finish(&mut self, phase: Phase) {
        self.phase = phase;
        self.loading = false;
    }
}

/// Transport errors are shown verbatim; anything else gets the fixed text
fn user_message(err: &ApiError, fixed: &str) -> String {
    match err {
        ApiError::Transport(e) => e.to_string(),
        _ => fixed.to_string(),
    }
}

/// One submission: POST, then sequential status polls until a terminal state
/// or an error. Stops early if the controller is gone.
async fn run_cycle(
    api: Arc<dyn BackendApi>,
    request: DownloadRequest,
    poll_interval: Duration,
    ticket: u64,
    tx: UnboundedSender<Tagged>,
) {
    let send = |event: CycleEvent| tx.send(Tagged { ticket, event }).is_ok();

    // 1. submit
    let task = match api.submit(&request).await {
        Ok(resp) => {
            tracing::debug!(task = %resp.task_id, state = ?resp.status, "submit accepted");
            resp.task_id
        }
        Err(err) => {
            send(CycleEvent::SubmitFailed(err));
            return;
        }
    };
    if !send(CycleEvent::Accepted(task.clone())) {
        return;
    }

    // 2. poll until terminal; one request in flight at a time
    loop {
        match api.status(&task).await {
            Ok(status) => {
                let terminal = status.state.is_terminal();
                if !send(CycleEvent::Status(task.clone(), status)) || terminal {
                    return;
                }
                tokio::time::sleep(poll_interval).await;
            }
            Err(err) => {
                send(CycleEvent::PollFailed(task, err));
                return;
            }
        }
    }
}
