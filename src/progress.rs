use crate::model::DownloadStatus;

/// Converts a 0..100 percentage into the 0.0..=1.0 fraction egui's progress bar expects
pub fn fraction(progress: f64) -> f32 {
    if !progress.is_finite() {
        return 0.0;
    }
    (progress / 100.0).clamp(0.0, 1.0) as f32
}

/// "50% complete", or `None` when the backend sent no progress
pub fn progress_text(status: &DownloadStatus) -> Option<String> {
    status
        .progress
        .filter(|p| p.is_finite())
        .map(|p| format!("{}% complete", p.clamp(0.0, 100.0).round() as u32))
}

pub fn speed_text(status: &DownloadStatus) -> Option<String> {
    status
        .speed
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "N/A")
        .map(|s| format!("Speed: {s}"))
}
