#![forbid(unsafe_code)]

use argonaut_core::FilterDimension;
use argonaut_search::{kind_for_shortcut, kind_shortcut, projects};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::model::{FilterMenu, Overlay};
use crate::ArgonautApp;

pub(crate) const FILTER_ROOT_ITEMS: [&str; 4] = ["Clear all filters", "Project filter", "Health filter", "Sync filter"];
pub(crate) const ALL_KINDS: &str = "All kinds";

/// Menu shortcuts on the application filter root: letter, dimension, value.
pub(crate) const APP_FILTER_SHORTCUTS: [(char, FilterDimension, &str); 5] = [
    ('h', FilterDimension::Health, "Healthy"),
    ('p', FilterDimension::Health, "Progressing"),
    ('d', FilterDimension::Health, "Degraded"),
    ('s', FilterDimension::Sync, "Synced"),
    ('o', FilterDimension::Sync, "OutOfSync"),
];

fn step(cursor: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down { (cursor + 1).min(len - 1) } else { cursor.saturating_sub(1) }
}

impl ArgonautApp {
    pub(crate) fn open_filter_menu(&mut self) {
        self.overlay = Overlay::Filter(FilterMenu::Root { cursor: 0 });
    }

    /// Values offered for one application dimension, from the loaded list.
    pub(crate) fn filter_options(&self, dim: FilterDimension) -> Vec<String> {
        let mut out: Vec<String> = match dim {
            FilterDimension::Project => projects(&self.apps.apps),
            FilterDimension::Health => self.apps.apps.iter().map(|a| a.health.clone()).collect(),
            FilterDimension::Sync => self.apps.apps.iter().map(|a| a.sync.clone()).collect(),
            FilterDimension::Kind => Vec::new(),
        };
        out.retain(|v| !v.is_empty());
        out.sort();
        out.dedup();
        out
    }

    pub(crate) fn open_kind_menu(&mut self) {
        let kinds = self.tree.view.root_kinds_with_children();
        let cursor = self
            .tree
            .view
            .filters()
            .get(FilterDimension::Kind)
            .and_then(|k| kinds.iter().position(|x| x == k))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.overlay = Overlay::KindMenu { kinds, cursor };
    }

    fn set_app_filter(&mut self, dim: FilterDimension, value: &str) {
        debug!(dim = %dim, value, "ui: app filter set");
        self.apps.filters.set(dim, value);
        self.reproject_apps();
    }

    pub(crate) fn set_tree_kind(&mut self, kind: Option<&str>) {
        self.tree.view.set_filter(FilterDimension::Kind, kind.unwrap_or(""));
        self.reproject_tree();
    }
}

pub(crate) fn handle_filter_menu_key(app: &mut ArgonautApp, menu: FilterMenu, key: KeyEvent) {
    match menu {
        FilterMenu::Root { cursor } => match key.code {
            KeyCode::Esc => app.overlay = Overlay::None,
            KeyCode::Up | KeyCode::Down => {
                let cursor = step(cursor, FILTER_ROOT_ITEMS.len(), key.code == KeyCode::Down);
                app.overlay = Overlay::Filter(FilterMenu::Root { cursor });
            }
            KeyCode::Enter => {
                let dim = match cursor {
                    1 => FilterDimension::Project,
                    2 => FilterDimension::Health,
                    3 => FilterDimension::Sync,
                    _ => {
                        app.overlay = Overlay::None;
                        app.apps.filters.clear();
                        app.reproject_apps();
                        return;
                    }
                };
                let options = app.filter_options(dim);
                app.overlay = Overlay::Filter(FilterMenu::Pick { dim, options, cursor: 0 });
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                app.overlay = Overlay::None;
                app.apps.filters.clear();
                app.reproject_apps();
            }
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if let Some((_, dim, value)) = APP_FILTER_SHORTCUTS.iter().find(|(s, _, _)| *s == c) {
                    app.overlay = Overlay::None;
                    app.set_app_filter(*dim, value);
                }
            }
            _ => {}
        },
        FilterMenu::Pick { dim, options, cursor } => match key.code {
            KeyCode::Esc => {
                let root = 1 + [FilterDimension::Project, FilterDimension::Health, FilterDimension::Sync]
                    .iter()
                    .position(|d| *d == dim)
                    .unwrap_or(0);
                app.overlay = Overlay::Filter(FilterMenu::Root { cursor: root });
            }
            KeyCode::Up | KeyCode::Down => {
                let cursor = step(cursor, options.len(), key.code == KeyCode::Down);
                app.overlay = Overlay::Filter(FilterMenu::Pick { dim, options, cursor });
            }
            KeyCode::Enter => {
                app.overlay = Overlay::None;
                if let Some(value) = options.get(cursor) {
                    app.set_app_filter(dim, value);
                }
            }
            _ => app.overlay = Overlay::Filter(FilterMenu::Pick { dim, options, cursor }),
        },
    }
}

pub(crate) fn handle_kind_menu_key(app: &mut ArgonautApp, kinds: Vec<String>, cursor: usize, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.overlay = Overlay::None,
        KeyCode::Up | KeyCode::Down => {
            let cursor = step(cursor, kinds.len() + 1, key.code == KeyCode::Down);
            app.overlay = Overlay::KindMenu { kinds, cursor };
        }
        KeyCode::Enter => {
            app.overlay = Overlay::None;
            let kind = cursor.checked_sub(1).and_then(|i| kinds.get(i)).cloned();
            app.set_tree_kind(kind.as_deref());
        }
        KeyCode::Char(c) => match kind_for_shortcut(c).filter(|k| kinds.iter().any(|x| x == k)) {
            Some(kind) => {
                app.overlay = Overlay::None;
                app.set_tree_kind(Some(kind));
            }
            None => app.overlay = Overlay::KindMenu { kinds, cursor },
        },
        _ => app.overlay = Overlay::KindMenu { kinds, cursor },
    }
}

/// Display label for a kind menu entry.
pub(crate) fn kind_menu_label(kind: &str) -> String {
    match kind_shortcut(kind) {
        Some(c) => format!("[{}] {}", c, kind),
        None => format!("    {}", kind),
    }
}
