use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::{FormatId, QualityId};

/// Body of `POST /download`, built fresh for each submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRequest {
    /// Video page URL as typed by the user
    pub url: String,
    /// Requested output container
    pub format: FormatId,
    /// Only present for formats with a quality axis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityId>,
}

impl DownloadRequest {
    /// Builds a request, dropping the quality when the format has none
    pub fn new(url: impl Into<String>, format: FormatId, quality: QualityId) -> Self {
        Self {
            url: url.into(),
            format,
            quality: crate::format::supports_quality(format).then_some(quality),
        }
    }
}

/// Backend task identifier for one submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    #[cfg(test)]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents the backend's view of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Download or conversion still running
    Processing,
    /// File is ready at `/download/{task_id}`
    Completed,
    /// Backend gave up; see `DownloadStatus::error`
    Error,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskState::Processing)
    }
}

/// Body of `GET /status/{task_id}`. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadStatus {
    /// Current state of the task
    #[serde(rename = "status")]
    pub state: TaskState,
    /// Format id as echoed by the backend
    #[serde(default)]
    pub format: String,
    /// Source URL as echoed by the backend
    #[serde(default)]
    pub url: String,
    /// Backend-reported failure message
    #[serde(default)]
    pub error: Option<String>,
    /// Percentage 0..100
    #[serde(default)]
    pub progress: Option<f64>,
    /// Human-readable transfer speed, e.g. "1.2 MB/s"
    #[serde(default)]
    pub speed: Option<String>,
}

/// Body of a successful `POST /download`
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub task_id: TaskHandle,
    #[serde(default)]
    pub status: Option<TaskState>,
}

/// Body of `GET /logs`
#[derive(Debug, Clone, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

/// Body of `POST /update-yt-dlp`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_quality_only_for_video() {
        let video = DownloadRequest::new("https://example/video", FormatId::Mp4, QualityId::Auto);
        assert_eq!(
            serde_json::to_value(&video).unwrap(),
            serde_json::json!({"url": "https://example/video", "format": "mp4", "quality": "auto"})
        );

        let audio = DownloadRequest::new("https://example/video", FormatId::Mp3, QualityId::High);
        assert_eq!(
            serde_json::to_value(&audio).unwrap(),
            serde_json::json!({"url": "https://example/video", "format": "mp3"})
        );
    }

    #[test]
    fn status_body_accepts_nulls_and_missing_fields() {
        let status: DownloadStatus = serde_json::from_str(
            r#"{"status":"processing","format":"mp4","url":"u","error":null,"progress":50.0,"speed":"1.2 MB/s"}"#,
        )
        .unwrap();
        assert_eq!(status.state, TaskState::Processing);
        assert_eq!(status.progress, Some(50.0));
        assert_eq!(status.error, None);

        let done: DownloadStatus = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert!(done.state.is_terminal());
        assert_eq!(done.speed, None);
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert!(serde_json::from_str::<DownloadStatus>(r#"{"status":"paused"}"#).is_err());
    }
}
