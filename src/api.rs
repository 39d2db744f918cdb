//! REST client for the download backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    config::Config,
    error::{ApiError, ConfigError, Result},
    model::{DownloadRequest, DownloadStatus, LogsResponse, SubmitResponse, TaskHandle, UpdateResponse},
};

/// Everything the UI needs from the backend
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `POST /download`
    async fn submit(&self, request: &DownloadRequest) -> Result<SubmitResponse>;

    /// `GET /status/{task_id}`
    async fn status(&self, task: &TaskHandle) -> Result<DownloadStatus>;

    /// `GET /logs`, the backend's full current log snapshot
    async fn logs(&self) -> Result<Vec<String>>;

    /// `POST /update-yt-dlp`
    async fn update_tool(&self) -> Result<UpdateResponse>;

    /// Where the finished file can be fetched. Never requested by the client itself.
    fn file_url(&self, task: &TaskHandle) -> String;
}

pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> std::result::Result<Self, ConfigError> {
        let base = config.backend_base()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        tracing::info!("backend at {}", base);
        Ok(Self { client, base })
    }

    /// Appends path segments to the base, percent-encoding each one.
    /// `backend_base` only hands out bases that accept path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response, context: &'static str) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Rejected {
            context,
            status: status.as_u16(),
        });
    }
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn submit(&self, request: &DownloadRequest) -> Result<SubmitResponse> {
        let url = self.endpoint(&["download"]);
        tracing::debug!("POST {} {:?}", url, request);
        let resp = self.client.post(url).json(request).send().await?;
        read_json(resp, "download request").await
    }

    async fn status(&self, task: &TaskHandle) -> Result<DownloadStatus> {
        let url = self.endpoint(&["status", task.as_str()]);
        let resp = self.client.get(url).send().await?;
        read_json(resp, "status").await
    }

    async fn logs(&self) -> Result<Vec<String>> {
        let resp = self.client.get(self.endpoint(&["logs"])).send().await?;
        let body: LogsResponse = read_json(resp, "logs").await?;
        Ok(body.logs)
    }

    async fn update_tool(&self) -> Result<UpdateResponse> {
        let resp = self.client.post(self.endpoint(&["update-yt-dlp"])).send().await?;
        read_json(resp, "update").await
    }

    fn file_url(&self, task: &TaskHandle) -> String {
        self.endpoint(&["download", task.as_str()]).to_string()
    }
}
