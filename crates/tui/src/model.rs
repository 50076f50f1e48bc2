#![forbid(unsafe_code)]

use std::time::{Duration, Instant};

use argonaut_core::{Application, FilterDimension, FilterState, ResourceRecord, TreeRow};
use argonaut_search::AppFilterDebug;
use argonaut_store::{RebuildPolicy, TreeViewState};

/// Messages from background tasks. Only the UI loop applies them to state.
#[derive(Debug)]
pub enum UiUpdate {
    RefreshTick,
    Applications(Vec<Application>),
    ResourceTree { app: String, records: Vec<ResourceRecord>, policy: RebuildPolicy },
    FetchFailed { what: String, error: String },
    ActionDone { action: ActionKind, app: String },
    ActionFailed { action: ActionKind, app: String, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Sync,
    Delete,
    Refresh,
    HardRefresh,
}

impl ActionKind {
    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Sync => "sync",
            ActionKind::Delete => "delete",
            ActionKind::Refresh => "refresh",
            ActionKind::HardRefresh => "hard refresh",
        }
    }

    pub fn past(&self) -> &'static str {
        match self {
            ActionKind::Sync => "synced",
            ActionKind::Delete => "deleted",
            ActionKind::Refresh => "refreshed",
            ActionKind::HardRefresh => "hard refreshed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    InstanceSelect,
    #[default]
    AppList,
    Tree,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warn,
    Error,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub created: Instant,
    pub duration_ms: u64,
}

/// Trailing-edge debounce for search text.
#[derive(Debug, Clone, Default)]
pub struct DebounceState {
    pub pending: Option<String>,
    pub changed_at: Option<Instant>,
    pub delay_ms: u64,
}

impl DebounceState {
    pub fn new(delay_ms: u64) -> Self { Self { delay_ms, ..Default::default() } }

    /// Replace the pending text and restart the window.
    pub fn push(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some(text.into());
        self.changed_at = Some(now);
    }

    /// Pending text once the window has elapsed without a newer keystroke.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        let since = self.changed_at?;
        if now.saturating_duration_since(since) < Duration::from_millis(self.delay_ms) {
            return None;
        }
        self.changed_at = None;
        self.pending.take()
    }

    /// Commit immediately, bypassing the window.
    pub fn flush(&mut self) -> Option<String> {
        self.changed_at = None;
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.changed_at = None;
    }

    pub fn is_pending(&self) -> bool { self.pending.is_some() }
}

/// Search line editor shared by the list and tree screens.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub active: bool,
    pub text: String,
    pub debounce: DebounceState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMenu {
    /// Category chooser: clear, project, health, sync.
    Root { cursor: usize },
    Pick { dim: FilterDimension, options: Vec<String>, cursor: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help,
    Filter(FilterMenu),
    /// Kind choices; index 0 is "All kinds".
    KindMenu { kinds: Vec<String>, cursor: usize },
    ConfirmDelete(String),
}

#[derive(Debug, Default)]
pub struct InstanceSelectState {
    pub selected: usize,
}

#[derive(Debug, Default)]
pub struct AppListState {
    pub apps: Vec<Application>,
    pub filters: FilterState,
    pub search: String,
    pub visible: Vec<Application>,
    pub debug: AppFilterDebug,
    pub selected: usize,
    pub loaded: bool,
    pub loading: bool,
}

#[derive(Debug, Default)]
pub struct TreeScreenState {
    pub app: String,
    pub view: TreeViewState,
    pub rows: Vec<TreeRow>,
    pub selected: usize,
    pub loaded: bool,
    pub loading: bool,
    pub last_notice: Option<String>,
}

#[derive(Default)]
pub struct RefreshState {
    pub task: Option<tokio::task::JoinHandle<()>>,
    pub stop: Option<tokio::sync::oneshot::Sender<()>>,
    pub interval_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_fires_once_after_quiet_window() {
        let t0 = Instant::now();
        let mut d = DebounceState::new(500);
        d.push("w", t0);
        d.push("we", t0 + Duration::from_millis(200));
        d.push("web", t0 + Duration::from_millis(400));
        assert_eq!(d.take_due(t0 + Duration::from_millis(800)), None, "window restarts on each keystroke");
        assert_eq!(d.take_due(t0 + Duration::from_millis(900)).as_deref(), Some("web"));
        assert_eq!(d.take_due(t0 + Duration::from_millis(2000)), None, "fires once");
    }

    #[test]
    fn flush_and_cancel() {
        let t0 = Instant::now();
        let mut d = DebounceState::new(500);
        d.push("api", t0);
        assert_eq!(d.flush().as_deref(), Some("api"));
        assert!(!d.is_pending());
        d.push("x", t0);
        d.cancel();
        assert_eq!(d.take_due(t0 + Duration::from_secs(5)), None);
    }
}
