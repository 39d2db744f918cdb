//! Scripted stand-ins for the backend and the browser.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    api::BackendApi,
    error::{ApiError, Result},
    model::{DownloadRequest, DownloadStatus, SubmitResponse, TaskHandle, TaskState, UpdateResponse},
    opener::FileOpener,
};

#[derive(Default)]
pub struct ScriptedBackend {
    submits: Mutex<VecDeque<Result<SubmitResponse>>>,
    statuses: Mutex<VecDeque<Result<DownloadStatus>>>,
    logs: Mutex<VecDeque<Result<Vec<String>>>>,
    updates: Mutex<VecDeque<Result<UpdateResponse>>>,
    pub submitted: Mutex<Vec<DownloadRequest>>,
    pub polled: Mutex<Vec<TaskHandle>>,
    pub log_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept(&self, task_id: &str) {
        self.submits.lock().unwrap().push_back(Ok(SubmitResponse {
            task_id: TaskHandle::new(task_id),
            status: Some(TaskState::Processing),
        }));
    }

    pub fn fail_submit(&self, err: ApiError) {
        self.submits.lock().unwrap().push_back(Err(err));
    }

    pub fn reply_status(&self, status: DownloadStatus) {
        self.statuses.lock().unwrap().push_back(Ok(status));
    }

    pub fn fail_status(&self, err: ApiError) {
        self.statuses.lock().unwrap().push_back(Err(err));
    }

    pub fn reply_logs(&self, lines: &[&str]) {
        let lines = lines.iter().map(|l| l.to_string()).collect();
        self.logs.lock().unwrap().push_back(Ok(lines));
    }

    pub fn fail_logs(&self, err: ApiError) {
        self.logs.lock().unwrap().push_back(Err(err));
    }

    pub fn reply_update(&self, resp: UpdateResponse) {
        self.updates.lock().unwrap().push_back(Ok(resp));
    }

    pub fn fail_update(&self, err: ApiError) {
        self.updates.lock().unwrap().push_back(Err(err));
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn poll_count(&self) -> usize {
        self.polled.lock().unwrap().len()
    }
}

#[async_trait]
impl BackendApi for ScriptedBackend {
    async fn submit(&self, request: &DownloadRequest) -> Result<SubmitResponse> {
        self.submitted.lock().unwrap().push(request.clone());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Malformed("no scripted submit reply".into())))
    }

    async fn status(&self, task: &TaskHandle) -> Result<DownloadStatus> {
        self.polled.lock().unwrap().push(task.clone());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Malformed("no scripted status reply".into())))
    }

    async fn logs(&self) -> Result<Vec<String>> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        self.logs.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn update_tool(&self) -> Result<UpdateResponse> {
        self.updates.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(UpdateResponse {
                success: true,
                message: "managed by release builds".into(),
                version: None,
                location: None,
            })
        })
    }

    fn file_url(&self, task: &TaskHandle) -> String {
        format!("http://localhost:5000/download/{task}")
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl FileOpener for RecordingOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Behaves like a machine without a default browser
pub struct FailingOpener;

impl FileOpener for FailingOpener {
    fn open(&self, _url: &str) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
    }
}

pub fn status(state: TaskState, progress: Option<f64>, speed: Option<&str>) -> DownloadStatus {
    DownloadStatus {
        state,
        format: "mp4".into(),
        url: "https://example/video".into(),
        error: None,
        progress,
        speed: speed.map(str::to_owned),
    }
}

/// A genuine transport-level error, produced without touching the network
pub async fn transport_error() -> ApiError {
    let err = reqwest::Client::new()
        .get("not a url")
        .send()
        .await
        .expect_err("relative url must fail");
    ApiError::Transport(err)
}
