#![forbid(unsafe_code)]

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::model::{ActionKind, Screen, ToastKind};
use crate::{ArgonautApp, UiUpdate};

const MAX_PER_FRAME: usize = 256;

/// Drain background updates (bounded per frame). Returns how many were applied.
pub(crate) fn process_updates(app: &mut ArgonautApp) -> usize {
    let t0 = Instant::now();
    let mut processed = 0usize;
    let mut refetch = false;
    while processed < MAX_PER_FRAME {
        let Ok(update) = app.updates_rx.try_recv() else { break };
        processed += 1;
        match update {
            UiUpdate::RefreshTick => {
                debug!(screen = ?app.screen, "ui: refresh tick");
                refetch = true;
            }
            UiUpdate::Applications(apps) => {
                let count = apps.len();
                app.apps.apps = apps;
                app.apps.loaded = true;
                app.apps.loading = false;
                if app.screen == Screen::Tree {
                    if let Some(a) = app.apps.apps.iter().find(|a| a.name == app.tree.app) {
                        app.info = app.info.clone().with_app(a.name.clone(), a.health.clone(), a.sync.clone());
                    }
                }
                app.reproject_apps();
                info!(total = count, visible = app.apps.visible.len(), "ui: applications applied");
            }
            UiUpdate::ResourceTree { app: name, records, policy } => {
                if app.screen != Screen::Tree || app.tree.app != name {
                    debug!(app = %name, "ui: stale resource tree dropped");
                    continue;
                }
                app.tree.view.rebuild(records, policy);
                app.tree.loaded = true;
                app.tree.loading = false;
                app.reproject_tree();
            }
            UiUpdate::FetchFailed { what, error } => {
                app.apps.loading = false;
                app.tree.loading = false;
                app.toast(format!("fetch {} failed: {}", what, error), ToastKind::Error);
            }
            UiUpdate::ActionDone { action, app: name } => {
                app.toast(format!("App {} {} successfully", name, action.past()), ToastKind::Success);
                if action == ActionKind::Delete && app.screen == Screen::Tree && app.tree.app == name {
                    app.back();
                }
                refetch = true;
            }
            UiUpdate::ActionFailed { action, app: name, error } => {
                app.toast(format!("{} {} failed: {}", action.verb(), name, error), ToastKind::Error);
            }
        }
    }
    if refetch {
        app.refetch_active();
    }
    if processed > 0 {
        counter!("ui_updates_processed_per_frame", processed as u64);
        histogram!("ui_updates_apply_ms", t0.elapsed().as_secs_f64() * 1000.0);
    }
    processed
}

#[cfg(test)]
mod tests {
    use argonaut_core::{Application, ResourceRecord};
    use argonaut_store::RebuildPolicy;

    use super::*;
    use crate::ui::tests_support::empty_app;

    fn app(name: &str, health: &str) -> Application {
        Application { name: name.into(), health: health.into(), sync: "Synced".into(), project: "p".into(), ..Default::default() }
    }

    #[test]
    fn applications_update_reprojects_list() {
        let mut ui = empty_app();
        ui.screen = Screen::AppList;
        ui.updates_tx.send(UiUpdate::Applications(vec![app("web", "Healthy"), app("db", "Degraded")])).expect("send");
        assert_eq!(process_updates(&mut ui), 1);
        assert_eq!(ui.visible_apps().len(), 2);
        assert!(ui.apps.loaded);
    }

    #[test]
    fn stale_tree_results_are_dropped() {
        let mut ui = empty_app();
        ui.screen = Screen::Tree;
        ui.tree.app = "web".into();
        let rec = ResourceRecord { uid: "1".into(), kind: "Pod".into(), name: "p".into(), ..Default::default() };
        ui.updates_tx
            .send(UiUpdate::ResourceTree { app: "other".into(), records: vec![rec.clone()], policy: RebuildPolicy::Fresh })
            .expect("send");
        process_updates(&mut ui);
        assert!(ui.tree_rows().is_empty());
        ui.updates_tx.send(UiUpdate::ResourceTree { app: "web".into(), records: vec![rec], policy: RebuildPolicy::Fresh }).expect("send");
        process_updates(&mut ui);
        assert_eq!(ui.tree_rows().len(), 1);
    }

    #[test]
    fn fetch_failure_keeps_last_good_data() {
        let mut ui = empty_app();
        ui.screen = Screen::AppList;
        ui.updates_tx.send(UiUpdate::Applications(vec![app("web", "Healthy")])).expect("send");
        ui.updates_tx.send(UiUpdate::FetchFailed { what: "applications".into(), error: "timeout".into() }).expect("send");
        process_updates(&mut ui);
        assert_eq!(ui.visible_apps().len(), 1);
        assert_eq!(ui.toasts().last().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[test]
    fn drain_is_bounded_per_frame() {
        let mut ui = empty_app();
        ui.screen = Screen::InstanceSelect;
        for _ in 0..300 {
            ui.updates_tx.send(UiUpdate::FetchFailed { what: "x".into(), error: "y".into() }).expect("send");
        }
        assert_eq!(process_updates(&mut ui), 256);
        assert_eq!(process_updates(&mut ui), 44);
    }
}
