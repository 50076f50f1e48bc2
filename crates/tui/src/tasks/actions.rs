#![forbid(unsafe_code)]

use std::time::Instant;

use argonaut_api::RefreshKind;
use tracing::{info, warn};

use crate::{ActionKind, ArgonautApp, ToastKind, UiUpdate};

impl ArgonautApp {
    /// Run a mutating call in the background; completion arrives as `ActionDone`/`ActionFailed`.
    pub(crate) fn start_action(&mut self, action: ActionKind, app: String) {
        let Some(api) = self.api.clone() else { return };
        self.toast(format!("{}: {}…", action.verb(), app), ToastKind::Info);
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let t0 = Instant::now();
            let res = match action {
                ActionKind::Sync => api.sync_application(&app).await,
                ActionKind::Delete => api.delete_application(&app).await,
                ActionKind::Refresh => api.refresh_application(&app, RefreshKind::Normal).await,
                ActionKind::HardRefresh => api.refresh_application(&app, RefreshKind::Hard).await,
            };
            let msg = match res {
                Ok(()) => {
                    info!(action = action.verb(), app = %app, took_ms = %t0.elapsed().as_millis(), "ui: action ok");
                    UiUpdate::ActionDone { action, app }
                }
                Err(e) => {
                    warn!(action = action.verb(), app = %app, error = %e, "ui: action failed");
                    UiUpdate::ActionFailed { action, app, error: e.to_string() }
                }
            };
            let _ = tx.send(msg);
        });
    }
}
