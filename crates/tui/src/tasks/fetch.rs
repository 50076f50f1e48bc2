#![forbid(unsafe_code)]

use std::time::Instant;

use argonaut_store::RebuildPolicy;
use tracing::{info, warn};

use crate::{ArgonautApp, UiUpdate};

impl ArgonautApp {
    pub(crate) fn start_apps_fetch(&mut self) {
        let Some(api) = self.api.clone() else { return };
        self.apps.loading = true;
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let t0 = Instant::now();
            let msg = match api.list_applications().await {
                Ok(apps) => {
                    info!(count = apps.len(), took_ms = %t0.elapsed().as_millis(), "ui: applications fetched");
                    UiUpdate::Applications(apps)
                }
                Err(e) => {
                    warn!(error = %e, "ui: applications fetch failed");
                    UiUpdate::FetchFailed { what: "applications".into(), error: e.to_string() }
                }
            };
            let _ = tx.send(msg);
        });
    }

    pub(crate) fn start_tree_fetch(&mut self, policy: RebuildPolicy) {
        let Some(api) = self.api.clone() else { return };
        if self.tree.app.is_empty() {
            return;
        }
        self.tree.loading = true;
        let app = self.tree.app.clone();
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let t0 = Instant::now();
            let msg = match api.resource_tree(&app).await {
                Ok(records) => {
                    info!(app = %app, records = records.len(), took_ms = %t0.elapsed().as_millis(), "ui: resource tree fetched");
                    UiUpdate::ResourceTree { app, records, policy }
                }
                Err(e) => {
                    warn!(app = %app, error = %e, "ui: resource tree fetch failed");
                    UiUpdate::FetchFailed { what: format!("resources for {}", app), error: e.to_string() }
                }
            };
            let _ = tx.send(msg);
        });
    }
}
