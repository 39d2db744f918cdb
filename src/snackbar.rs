//! One-at-a-time transient notifications shown at the bottom of the window.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
}

pub struct Snackbar {
    current: Option<Notification>,
    /// Auto-dismiss deadline of the notification currently shown
    deadline: Option<Instant>,
    duration: Duration,
}

impl Snackbar {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            deadline: None,
            duration,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(message, severity, Instant::now());
    }

    /// Replaces whatever is shown and re-arms the deadline. The previous
    /// deadline is overwritten, so it can never close this notification.
    pub fn show_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        let message = message.into();
        tracing::debug!(?severity, %message, "snackbar");
        self.current = Some(Notification {
            message,
            severity,
            visible: true,
        });
        self.deadline = Some(now + self.duration);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Success);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Info);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Error);
    }

    /// Hides the notification; message and severity stay readable
    pub fn dismiss(&mut self) {
        if let Some(n) = self.current.as_mut() {
            n.visible = false;
        }
        self.deadline = None;
    }

    /// Called every frame; returns true when this call dismissed something
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.dismiss();
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    #[cfg(test)]
    pub fn visible(&self) -> Option<&Notification> {
        self.current.as_ref().filter(|n| n.visible)
    }
}
