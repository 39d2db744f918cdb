//! Backend log panel refresh.
//!
//! While the panel is visible a single background task fetches `/logs`,
//! waits for the answer, then sleeps until the next tick, so fetches never
//! overlap. Each snapshot replaces the buffer as a whole.

use std::{sync::Arc, time::Duration};

use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::api::BackendApi;

pub struct LogPoller {
    api: Arc<dyn BackendApi>,
    runtime: Handle,
    interval: Duration,
    /// Whether the side panel is open
    visible: bool,
    /// Replaced wholesale by each snapshot
    lines: Vec<String>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every start/stop so snapshots from a cancelled timer are ignored
    generation: u64,
    tx: UnboundedSender<(u64, Vec<String>)>,
    rx: UnboundedReceiver<(u64, Vec<String>)>,
}

impl LogPoller {
    pub fn new(api: Arc<dyn BackendApi>, runtime: Handle, interval: Duration) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            runtime,
            interval,
            visible: false,
            lines: Vec::new(),
            timer: None,
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of live refresh timers, 0 or 1
    #[cfg(test)]
    pub fn active_timers(&self) -> usize {
        self.timer.as_ref().filter(|t| !t.is_finished()).map_or(0, |_| 1)
    }

    /// Fetches immediately, then every `interval` until [`stop`](Self::stop)
    pub fn start(&mut self) {
        // restart rather than stack a second timer
        self.cancel_timer();
        self.visible = true;
        self.generation += 1;
        tracing::debug!(interval = ?self.interval, "log polling started");
        self.timer = Some(self.runtime.spawn(poll_logs(
            Arc::clone(&self.api),
            self.interval,
            self.generation,
            self.tx.clone(),
        )));
    }

    pub fn stop(&mut self) {
        self.cancel_timer();
        self.visible = false;
        self.generation += 1;
        tracing::debug!("log polling stopped");
    }

    pub fn toggle(&mut self) -> bool {
        if self.visible {
            self.stop();
        } else {
            self.start();
        }
        self.visible
    }

    /// Applies the newest snapshot that has arrived, if any
    pub fn pump(&mut self) -> bool {
        let mut replaced = false;
        while let Ok((generation, lines)) = self.rx.try_recv() {
            // snapshots from a cancelled timer are dropped here
            if generation == self.generation {
                self.lines = lines;
                replaced = true;
            }
        }
        replaced
    }

    /// Waits for the next snapshot of the running timer
    #[cfg(test)]
    pub async fn next_snapshot(&mut self) -> Option<&[String]> {
        while self.visible {
            let (generation, lines) = self.rx.recv().await?;
            if generation == self.generation {
                self.lines = lines;
                return Some(&self.lines);
            }
        }
        None
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for LogPoller {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn poll_logs(
    api: Arc<dyn BackendApi>,
    period: Duration,
    generation: u64,
    tx: UnboundedSender<(u64, Vec<String>)>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        // first tick completes immediately
        ticker.tick().await;
        match api.logs().await {
            Ok(lines) => {
                if tx.send((generation, lines)).is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!("failed to fetch backend logs: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::{error::ApiError, testing::ScriptedBackend};

    const PERIOD: Duration = Duration::from_millis(500);

    fn poller(api: &Arc<ScriptedBackend>) -> LogPoller {
        LogPoller::new(api.clone(), Handle::current(), PERIOD)
    }

    #[tokio::test(start_paused = true)]
    async fn start_fetches_immediately_and_replaces_buffer() {
        let api = ScriptedBackend::new();
        api.reply_logs(&["[00:00:00] started", "[00:00:01] request received"]);
        api.reply_logs(&["[00:00:02] done"]);
        let mut logs = poller(&api);

        logs.start();
        let first = logs.next_snapshot().await.unwrap().to_vec();
        assert_eq!(first, vec!["[00:00:00] started", "[00:00:01] request received"]);

        let second = logs.next_snapshot().await.unwrap().to_vec();
        assert_eq!(second, vec!["[00:00:02] done"]);
        assert_eq!(logs.lines(), ["[00:00:02] done"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_follow_the_interval() {
        let api = ScriptedBackend::new();
        let mut logs = poller(&api);

        logs.start();
        tokio::time::sleep(PERIOD * 4 + PERIOD / 2).await;

        // t = 0, 500, 1000, 1500, 2000
        assert_eq!(api.log_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn toggling_twice_restores_state_with_no_timer_left() {
        let api = ScriptedBackend::new();
        let mut logs = poller(&api);
        assert_eq!(logs.active_timers(), 0);

        assert!(logs.toggle());
        assert_eq!(logs.active_timers(), 1);

        assert!(!logs.toggle());
        assert!(!logs.visible());
        tokio::task::yield_now().await;
        assert_eq!(logs.active_timers(), 0);

        let calls = api.log_calls.load(Ordering::SeqCst);
        tokio::time::sleep(PERIOD * 10).await;
        assert_eq!(api.log_calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_start_keeps_a_single_timer() {
        let api = ScriptedBackend::new();
        let mut logs = poller(&api);

        logs.start();
        logs.start();
        logs.start();
        tokio::time::sleep(PERIOD * 2 + PERIOD / 2).await;

        assert_eq!(logs.active_timers(), 1);
        // one timer: t = 0, 500, 1000
        assert_eq!(api.log_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_arriving_after_stop_is_ignored() {
        let api = ScriptedBackend::new();
        api.reply_logs(&["visible"]);
        api.reply_logs(&["late"]);
        let mut logs = poller(&api);

        logs.start();
        logs.next_snapshot().await;
        tokio::time::sleep(PERIOD + PERIOD / 2).await;
        logs.stop();

        assert!(!logs.pump());
        assert_eq!(logs.lines(), ["visible"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failures_keep_polling_silently() {
        let api = ScriptedBackend::new();
        api.fail_logs(ApiError::Rejected {
            context: "logs",
            status: 500,
        });
        api.reply_logs(&["recovered"]);
        let mut logs = poller(&api);

        logs.start();
        assert_eq!(logs.next_snapshot().await.unwrap(), ["recovered"]);
        assert_eq!(api.log_calls.load(Ordering::SeqCst), 2);
    }
}
