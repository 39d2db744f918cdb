//! The window: form, status card, log panel and snackbar.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use eframe::{App, Frame, egui};
use egui::Color32;
use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};

use crate::{
    api::BackendApi,
    config::Config,
    controller::{DownloadController, Phase, SubmitRejected},
    format::{self, FormatId, QualityId},
    logs::LogPoller,
    model::{DownloadRequest, TaskState, UpdateResponse},
    opener::FileOpener,
    progress,
    snackbar::{Severity, Snackbar},
};

const REPAINT_EVERY: Duration = Duration::from_millis(100);

/// Application state for the GUI
pub struct DownloaderApp {
    /// Input field for the video URL
    url_input: String,
    /// Selected output format
    format: FormatId,
    /// Selected video quality, kept while an audio format hides the selector
    quality: QualityId,
    controller: DownloadController,
    logs: LogPoller,
    snackbar: Snackbar,
    api: Arc<dyn BackendApi>,
    runtime: Handle,
    /// Results of "update yt-dlp" requests
    update_tx: UnboundedSender<Result<UpdateResponse, String>>,
    update_rx: UnboundedReceiver<Result<UpdateResponse, String>>,
    updating: bool,
}

impl DownloaderApp {
    pub fn new(config: &Config, api: Arc<dyn BackendApi>, opener: Arc<dyn FileOpener>, runtime: Handle) -> Self {
        let (update_tx, update_rx) = unbounded_channel();
        Self {
            url_input: String::new(),
            format: FormatId::default(),
            quality: QualityId::default(),
            controller: DownloadController::new(Arc::clone(&api), opener, runtime.clone(), config.poll_interval()),
            logs: LogPoller::new(Arc::clone(&api), runtime.clone(), config.log_interval()),
            snackbar: Snackbar::new(config.snackbar_duration()),
            api,
            runtime,
            update_tx,
            update_rx,
            updating: false,
        }
    }

    pub fn set_format(&mut self, format: FormatId) {
        self.format = format;
    }

    /// The stored quality survives switching to an audio format and back
    pub fn set_quality(&mut self, quality: QualityId) {
        self.quality = quality;
    }

    pub fn quality_selector_visible(&self) -> bool {
        format::supports_quality(self.format)
    }

    pub fn quality(&self) -> QualityId {
        self.quality
    }

    pub fn download_enabled(&self) -> bool {
        !self.controller.loading() && !self.url_input.trim().is_empty()
    }

    pub fn request(&self) -> DownloadRequest {
        DownloadRequest::new(self.url_input.trim(), self.format, self.quality)
    }

    pub fn submit(&mut self) -> Result<(), SubmitRejected> {
        let request = self.request();
        self.controller.submit(request, &mut self.snackbar)
    }

    pub fn toggle_logs(&mut self) -> bool {
        self.logs.toggle()
    }

    pub fn dismiss_snackbar(&mut self) {
        self.snackbar.dismiss();
    }

    pub fn request_tool_update(&mut self) {
        if self.updating {
            return;
        }
        self.updating = true;
        self.snackbar.info("Checking for yt-dlp updates...");
        let api = Arc::clone(&self.api);
        let tx = self.update_tx.clone();
        self.runtime.spawn(async move {
            let result = api.update_tool().await.map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    }

    /// Applies everything that arrived from background tasks since the last frame
    pub fn pump(&mut self, now: Instant) {
        self.controller.pump(&mut self.snackbar);
        self.logs.pump();
        while let Ok(result) = self.update_rx.try_recv() {
            self.updating = false;
            match result {
                Ok(resp) if resp.success => {
                    tracing::info!(version = ?resp.version, location = ?resp.location, "yt-dlp update: {}", resp.message);
                    self.snackbar.success(resp.message);
                }
                Ok(resp) => self.snackbar.error(format!("Update failed: {}", resp.message)),
                Err(e) => {
                    tracing::warn!("yt-dlp update request failed: {}", e);
                    self.snackbar.error(format!("Update failed: {e}"));
                }
            }
        }
        self.snackbar.tick(now);
    }

    fn form_ui(&mut self, ui: &mut egui::Ui) {
        let loading = self.controller.loading();

        ui.label("YouTube URL:");
        let url_field = ui.add_enabled(
            !loading,
            egui::TextEdit::singleline(&mut self.url_input).hint_text("https://www.youtube.com/watch?v=..."),
        );
        let enter_pressed = url_field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.add_space(8.0);
        ui.add_enabled_ui(!loading, |ui| {
            ui.horizontal(|ui| {
                let mut selected_format = self.format;
                egui::ComboBox::from_label("Format")
                    .selected_text(format::label_for(selected_format))
                    .show_ui(ui, |ui| {
                        for f in FormatId::ALL {
                            ui.selectable_value(&mut selected_format, f, format::label_for(f));
                        }
                    });
                self.set_format(selected_format);

                // hidden for audio formats; the stored quality is left alone
                if self.quality_selector_visible() {
                    let mut selected_quality = self.quality();
                    egui::ComboBox::from_label("Quality")
                        .selected_text(selected_quality.label())
                        .show_ui(ui, |ui| {
                            for q in QualityId::ALL {
                                ui.selectable_value(&mut selected_quality, q, q.label());
                            }
                        });
                    self.set_quality(selected_quality);
                }
            });
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let label = if loading { "Processing..." } else { "⬇ Download" };
            let clicked = ui.add_enabled(self.download_enabled(), egui::Button::new(label)).clicked();
            if loading {
                ui.add(egui::Spinner::new());
            }
            if clicked || (enter_pressed && !loading) {
                let _ = self.submit();
            }
        });
    }

    fn status_ui(&self, ui: &mut egui::Ui) {
        let Some(status) = self.controller.status() else {
            return;
        };
        ui.add_space(12.0);
        ui.group(|ui| {
            if let Some(task) = self.controller.task() {
                ui.small(format!("Task {task} ({})", format::label_for_raw(&status.format)));
            }
            self.status_body_ui(ui);
        });
    }

    /// Caption for a `processing` status. Polling may have stopped on a
    /// transport error, in which case the last progress stays visible.
    pub fn processing_caption(&self) -> Option<&'static str> {
        let status = self.controller.status()?;
        if status.state != TaskState::Processing {
            return None;
        }
        match self.controller.phase() {
            Phase::Failed => Some("Status updates stopped"),
            _ => Some("Downloading..."),
        }
    }

    fn status_body_ui(&self, ui: &mut egui::Ui) {
        let Some(status) = self.controller.status() else {
            return;
        };
        match status.state {
            TaskState::Processing => {
                ui.horizontal(|ui| {
                    // spinner only while polling is still running
                    if self.controller.loading() {
                        ui.add(egui::Spinner::new());
                    }
                    match self.processing_caption() {
                        Some(text) if !self.controller.loading() => {
                            ui.colored_label(Color32::LIGHT_RED, text);
                        }
                        Some(text) => {
                            ui.label(text);
                        }
                        None => {}
                    }
                });
                if let Some(p) = status.progress {
                    ui.add(egui::ProgressBar::new(progress::fraction(p)));
                }
                if let Some(text) = progress::progress_text(status) {
                    ui.label(text);
                }
                if let Some(text) = progress::speed_text(status) {
                    ui.label(text);
                }
            }
            TaskState::Completed => {
                ui.colored_label(Color32::LIGHT_GREEN, "✅ Download complete!");
            }
            TaskState::Error => {
                let message = self.controller.backend_error().unwrap_or_default();
                ui.colored_label(Color32::LIGHT_RED, format!("Error: {message}"));
            }
        }
    }

    fn footer_ui(&mut self, ui: &mut egui::Ui) {
        ui.add_space(16.0);
        let icon = if format::is_audio(self.format) { "🎵" } else { "🎬" };
        ui.label(format!("Current selection: {icon} {}", format::label_for(self.format)));

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let toggle_label = if self.logs.visible() {
                "Hide developer logs"
            } else {
                "Show developer logs"
            };
            if ui.button(toggle_label).clicked() {
                self.toggle_logs();
            }
            if ui.add_enabled(!self.updating, egui::Button::new("Update yt-dlp")).clicked() {
                self.request_tool_update();
            }
        });
    }

    fn snackbar_ui(&mut self, ctx: &egui::Context) {
        // a dismissed notification stays readable while it fades out
        let Some(n) = self.snackbar.current().cloned() else {
            return;
        };
        let opacity = ctx.animate_bool(egui::Id::new("snackbar_fade"), n.visible);
        if opacity <= 0.0 {
            return;
        }
        let fill = match n.severity {
            Severity::Success => Color32::from_rgb(46, 125, 50),
            Severity::Info => Color32::from_rgb(2, 136, 209),
            Severity::Warning => Color32::from_rgb(237, 108, 2),
            Severity::Error => Color32::from_rgb(211, 47, 47),
        }
        .gamma_multiply(opacity);
        egui::Area::new(egui::Id::new("snackbar"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).fill(fill).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(Color32::WHITE.gamma_multiply(opacity), &n.message);
                        if n.visible && ui.small_button("✖").clicked() {
                            self.dismiss_snackbar();
                        }
                    });
                });
            });
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.pump(Instant::now());

        // Right-side panel: backend log lines, only while toggled on
        if self.logs.visible() {
            egui::SidePanel::right("logs_panel").min_width(320.0).show(ctx, |ui| {
                ui.heading("Backend logs");
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in self.logs.lines() {
                            ui.monospace(line);
                        }
                    });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("YouTube Downloader");
            ui.label("Download videos as MP4 or audio as MP3, M4A, WAV, OGG, FLAC or Opus");
            ui.separator();
            self.form_ui(ui);
            self.status_ui(ui);
            self.footer_ui(ui);
        });

        self.snackbar_ui(ctx);

        // Request periodic repaint for polling results and the snackbar deadline
        ctx.request_repaint_after(REPAINT_EVERY);
    }
}
