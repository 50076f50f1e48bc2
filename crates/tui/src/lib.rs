//! Argonaut terminal UI.
//!
//! Three screens (instance selection, application list, resource tree) over one
//! [`ArgonautApp`] state. Background tasks never touch that state: they send
//! [`UiUpdate`]s which the UI loop drains once per frame.

#![forbid(unsafe_code)]

use std::sync::{mpsc, Arc};
use std::time::Instant;

use argonaut_api::{ApiResult, ArgoApi, Config, Instance, InstanceInfo};
use argonaut_core::{Application, FilterState, TreeRow};
use argonaut_search::filter_applications;
use argonaut_store::{FilterMode, RebuildPolicy, TreeViewState};
use tracing::{info, warn};

mod model;
mod tasks;
mod ui;
mod util;

use model::{AppListState, InputState, InstanceSelectState, RefreshState, TreeScreenState};
pub use model::{ActionKind, DebounceState, FilterMenu, Overlay, Screen, Toast, ToastKind, UiUpdate};
pub use ui::term::run_terminal;

/// Builds a client for the chosen instance.
pub type ApiFactory = Arc<dyn Fn(&Instance) -> ApiResult<Arc<dyn ArgoApi>> + Send + Sync>;

pub struct ArgonautApp {
    config: Config,
    factory: ApiFactory,
    api: Option<Arc<dyn ArgoApi>>,
    info: InstanceInfo,
    screen: Screen,
    select: InstanceSelectState,
    apps: AppListState,
    tree: TreeScreenState,
    overlay: Overlay,
    input: InputState,
    filter_mode: FilterMode,
    updates_tx: mpsc::Sender<UiUpdate>,
    updates_rx: mpsc::Receiver<UiUpdate>,
    refresh: RefreshState,
    toasts: Vec<Toast>,
    quit: bool,
}

impl ArgonautApp {
    pub fn new(config: Config, factory: ApiFactory) -> Self {
        let (tx, rx) = mpsc::channel::<UiUpdate>();
        let debounce_ms = util::env_u64("ARGONAUT_SEARCH_DEBOUNCE_MS", 500);
        let interval_secs = util::env_u64("ARGONAUT_REFRESH_SECS", 60);
        Self {
            config,
            factory,
            api: None,
            info: InstanceInfo::default(),
            screen: Screen::InstanceSelect,
            select: InstanceSelectState::default(),
            apps: AppListState::default(),
            tree: TreeScreenState::default(),
            overlay: Overlay::None,
            input: InputState { debounce: DebounceState::new(debounce_ms), ..Default::default() },
            filter_mode: FilterMode::default(),
            updates_tx: tx,
            updates_rx: rx,
            refresh: RefreshState { interval_secs, ..Default::default() },
            toasts: Vec::new(),
            quit: false,
        }
    }

    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Connect right away when the choice is unambiguous; otherwise show instance selection.
    pub fn start(&mut self, preferred: Option<&str>) {
        let chosen = match preferred {
            Some(name) => {
                let found = self.config.instance(Some(name)).cloned();
                if found.is_none() {
                    self.toast(format!("unknown instance: {}", name), ToastKind::Error);
                }
                found
            }
            None if !self.config.needs_selection() => self.config.instance(None).cloned(),
            None => None,
        };
        match chosen {
            Some(inst) => self.connect(&inst),
            None => self.screen = Screen::InstanceSelect,
        }
    }

    pub(crate) fn connect(&mut self, inst: &Instance) {
        match (self.factory)(inst) {
            Ok(api) => {
                info!(instance = %inst.name, url = %inst.url, "ui: connected");
                self.api = Some(api);
                self.info = InstanceInfo::for_instance(inst);
                self.apps = AppListState::default();
                self.reset_input();
                self.screen = Screen::AppList;
                self.start_apps_fetch();
                self.start_refresh_ticker();
            }
            Err(e) => {
                warn!(instance = %inst.name, error = %e, "ui: connect failed");
                self.toast(format!("connect {}: {}", inst.name, e), ToastKind::Error);
            }
        }
    }

    pub(crate) fn disconnect(&mut self) {
        self.stop_refresh_ticker();
        self.api = None;
        self.info = InstanceInfo::default();
        self.apps = AppListState::default();
        self.tree = TreeScreenState::default();
        self.reset_input();
        self.screen = Screen::InstanceSelect;
    }

    pub(crate) fn open_tree(&mut self, app: &Application) {
        info!(app = %app.name, "ui: open resource tree");
        self.tree = TreeScreenState {
            app: app.name.clone(),
            view: TreeViewState::new(self.filter_mode),
            loading: true,
            ..Default::default()
        };
        self.info = self.info.clone().with_app(app.name.clone(), app.health.clone(), app.sync.clone());
        self.reset_input();
        self.screen = Screen::Tree;
        self.start_tree_fetch(RebuildPolicy::Fresh);
    }

    pub(crate) fn back(&mut self) {
        match self.screen {
            Screen::Tree => {
                self.tree = TreeScreenState::default();
                self.info.app = None;
                self.reset_input();
                self.screen = Screen::AppList;
                self.reproject_apps();
            }
            Screen::AppList if self.config.needs_selection() => self.disconnect(),
            _ => {}
        }
    }

    /// Timer ticks and completed actions both land here.
    pub(crate) fn refetch_active(&mut self) {
        match self.screen {
            Screen::AppList => self.start_apps_fetch(),
            Screen::Tree => self.start_tree_fetch(RebuildPolicy::PreserveExpansion),
            Screen::InstanceSelect => {}
        }
    }

    pub(crate) fn reset_input(&mut self) {
        self.input.active = false;
        self.input.text.clear();
        self.input.debounce.cancel();
    }

    /// Commit search text to the active screen.
    pub(crate) fn apply_search(&mut self, text: String) {
        match self.screen {
            Screen::AppList => {
                self.apps.search = text.trim().to_string();
                self.reproject_apps();
            }
            Screen::Tree => {
                self.tree.view.set_search(text);
                self.reproject_tree();
            }
            Screen::InstanceSelect => {}
        }
    }

    pub(crate) fn reproject_apps(&mut self) {
        let prev = self.apps.visible.get(self.apps.selected).map(|a| a.name.clone());
        let outcome = filter_applications(&self.apps.apps, &self.apps.filters, &self.apps.search);
        self.apps.visible = outcome.apps;
        self.apps.debug = outcome.debug;
        self.apps.selected = prev
            .and_then(|n| self.apps.visible.iter().position(|a| a.name == n))
            .unwrap_or_else(|| util::clamp(self.apps.selected, self.apps.visible.len()));
    }

    pub(crate) fn reproject_tree(&mut self) {
        let prev = self.tree.rows.get(self.tree.selected).map(|r| r.key.clone());
        self.tree.rows = self.tree.view.rows();
        self.tree.selected = prev
            .and_then(|k| self.tree.rows.iter().position(|r| r.key == k))
            .unwrap_or_else(|| util::clamp(self.tree.selected, self.tree.rows.len()));
        let notice = self.tree.view.notice().map(|n| n.to_string());
        if notice.is_some() && notice != self.tree.last_notice {
            if let Some(text) = notice.clone() {
                self.toast(text, ToastKind::Warn);
            }
        }
        self.tree.last_notice = notice;
    }

    /// Per-frame housekeeping: debounced search and toast expiry.
    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.input.debounce.take_due(now) {
            self.apply_search(text);
        }
        self.expire_toasts(now);
    }

    pub fn process_updates(&mut self) -> usize { ui::updates::process_updates(self) }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) { ui::keys::handle_key(self, key) }

    pub fn render(&mut self, frame: &mut ratatui::Frame) { ui::render::draw(frame, self) }

    pub fn screen(&self) -> Screen { self.screen }
    pub fn overlay(&self) -> &Overlay { &self.overlay }
    pub fn should_quit(&self) -> bool { self.quit }
    pub fn info(&self) -> &InstanceInfo { &self.info }
    pub fn toasts(&self) -> &[Toast] { &self.toasts }
    pub fn input_text(&self) -> Option<&str> { self.input.active.then_some(self.input.text.as_str()) }
    pub fn visible_apps(&self) -> &[Application] { &self.apps.visible }
    pub fn app_filters(&self) -> &FilterState { &self.apps.filters }
    pub fn app_search(&self) -> &str { &self.apps.search }
    pub fn selected_app(&self) -> Option<&Application> { self.apps.visible.get(self.apps.selected) }
    pub fn tree_app(&self) -> Option<&str> { (self.screen == Screen::Tree).then_some(self.tree.app.as_str()) }
    pub fn tree_rows(&self) -> &[TreeRow] { &self.tree.rows }
    pub fn tree_view(&self) -> &TreeViewState { &self.tree.view }
    pub fn selected_row(&self) -> Option<&TreeRow> { self.tree.rows.get(self.tree.selected) }
}

impl Drop for ArgonautApp {
    fn drop(&mut self) { self.stop_refresh_ticker(); }
}
