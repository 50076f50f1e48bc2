#![forbid(unsafe_code)]

use std::time::Duration;

use tracing::{debug, info};

use crate::{ArgonautApp, UiUpdate};

impl ArgonautApp {
    /// Periodic `RefreshTick`s until stopped. Replaces a running ticker.
    pub(crate) fn start_refresh_ticker(&mut self) {
        self.stop_refresh_ticker();
        if self.refresh.interval_secs == 0 {
            info!("ui: auto-refresh disabled");
            return;
        }
        let period = Duration::from_secs(self.refresh.interval_secs);
        let tx = self.updates_tx.clone();
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();
        self.refresh.stop = Some(stop_tx);
        self.refresh.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        debug!("ui: refresh tick");
                        if tx.send(UiUpdate::RefreshTick).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("ui: refresh ticker ended");
        }));
        info!(interval_secs = self.refresh.interval_secs, "ui: auto-refresh started");
    }

    pub(crate) fn stop_refresh_ticker(&mut self) {
        if let Some(stop) = self.refresh.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.refresh.task.take() {
            task.abort();
        }
    }
}
