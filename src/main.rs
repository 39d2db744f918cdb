//! Desktop front-end for the YouTube download backend

// Window, form and per-frame dispatch
mod app;
// REST client for the backend
mod api;
// Config file and environment override
mod config;
// Submit-then-poll state machine
mod controller;
// Error enums
mod error;
// Output formats and qualities
mod format;
// Developer log panel refresh
mod logs;
// Request/response bodies
mod model;
// Opening the finished file
mod opener;
// Progress/speed text for the status card
mod progress;
// Transient notifications
mod snackbar;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use app::DownloaderApp;
use api::HttpBackend;
use config::Config;
use opener::BrowserOpener;

// eframe/egui for GUI application framework
use eframe::egui::Visuals;
// OnceCell for single-time runtime initialization
use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Program entry point: initializes logging, config and runtime, then launches the GUI
fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("falling back to default config: {}", e);
        Config::default()
    });

    let runtime = match RUNTIME.get_or_try_init(Runtime::new) {
        Ok(rt) => rt.handle().clone(),
        Err(e) => {
            tracing::error!("failed to start tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let api = match HttpBackend::new(&config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("cannot reach backend configuration: {}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "YouTube Downloader",
        options,
        Box::new(move |cc| {
            // Use dark theme visuals
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(DownloaderApp::new(&config, api, Arc::new(BrowserOpener), runtime))
        }),
    )
}
