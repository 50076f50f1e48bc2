#![forbid(unsafe_code)]

use std::time::Instant;

use argonaut_core::status::next_status;
use argonaut_core::{FilterDimension, HEALTH_STATUSES, SYNC_STATUSES};
use argonaut_search::kind_for_shortcut;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::model::{ActionKind, Overlay, Screen, ToastKind};
use crate::ui::menus::{handle_filter_menu_key, handle_kind_menu_key};
use crate::util::clamp;
use crate::ArgonautApp;

const PAGE: usize = 10;

pub(crate) fn handle_key(app: &mut ArgonautApp, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }
    match std::mem::take(&mut app.overlay) {
        Overlay::None => {}
        Overlay::Help => return,
        Overlay::Filter(menu) => return handle_filter_menu_key(app, menu, key),
        Overlay::KindMenu { kinds, cursor } => return handle_kind_menu_key(app, kinds, cursor, key),
        Overlay::ConfirmDelete(name) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.start_action(ActionKind::Delete, name),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => debug!(app = %name, "ui: delete canceled"),
                _ => app.overlay = Overlay::ConfirmDelete(name),
            }
            return;
        }
    }
    if app.input.active {
        return handle_input_key(app, key);
    }
    match app.screen {
        Screen::InstanceSelect => handle_instance_key(app, key),
        Screen::AppList => handle_app_list_key(app, key),
        Screen::Tree => handle_tree_key(app, key),
    }
}

fn handle_input_key(app: &mut ArgonautApp, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.input.active = false;
            app.input.debounce.cancel();
            let text = app.input.text.clone();
            app.apply_search(text);
        }
        KeyCode::Esc => {
            app.reset_input();
            app.apply_search(String::new());
        }
        KeyCode::Backspace => {
            app.input.text.pop();
            let text = app.input.text.clone();
            app.input.debounce.push(text, Instant::now());
        }
        KeyCode::Char(c) => {
            app.input.text.push(c);
            let text = app.input.text.clone();
            app.input.debounce.push(text, Instant::now());
        }
        _ => {}
    }
}

fn open_search(app: &mut ArgonautApp, current: String) {
    app.input.active = true;
    app.input.text = current;
    app.input.debounce.cancel();
}

/// Shared cursor movement; returns false when the key is not a movement key.
fn move_cursor(sel: &mut usize, len: usize, code: KeyCode) -> bool {
    *sel = match code {
        KeyCode::Up => sel.saturating_sub(1),
        KeyCode::Down => *sel + 1,
        KeyCode::PageUp => sel.saturating_sub(PAGE),
        KeyCode::PageDown => *sel + PAGE,
        KeyCode::Home => 0,
        KeyCode::End => len.saturating_sub(1),
        _ => return false,
    };
    *sel = clamp(*sel, len);
    true
}

fn handle_instance_key(app: &mut ArgonautApp, key: KeyEvent) {
    let len = app.config.instances.len();
    if move_cursor(&mut app.select.selected, len, key.code) {
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if let Some(inst) = app.config.instances.get(app.select.selected).cloned() {
                app.connect(&inst);
            }
        }
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        _ => {}
    }
}

fn toggle_app_filter(app: &mut ArgonautApp, dim: FilterDimension, value: &str) {
    app.apps.filters.toggle(dim, value);
    app.reproject_apps();
}

fn handle_app_list_key(app: &mut ArgonautApp, key: KeyEvent) {
    let len = app.apps.visible.len();
    if move_cursor(&mut app.apps.selected, len, key.code) {
        return;
    }
    let selected = app.selected_app().map(|a| a.name.clone());
    match key.code {
        KeyCode::Enter => {
            if let Some(a) = app.selected_app().cloned() {
                app.open_tree(&a);
            }
        }
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('I') => app.back(),
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        KeyCode::Char('/') | KeyCode::Char(':') => {
            let current = app.apps.search.clone();
            open_search(app, current);
        }
        KeyCode::Char('f') | KeyCode::Char('F') => app.open_filter_menu(),
        KeyCode::Char('h') => toggle_app_filter(app, FilterDimension::Health, "Healthy"),
        KeyCode::Char('p') => toggle_app_filter(app, FilterDimension::Health, "Progressing"),
        KeyCode::Char('d') => toggle_app_filter(app, FilterDimension::Health, "Degraded"),
        KeyCode::Char('s') => toggle_app_filter(app, FilterDimension::Sync, "Synced"),
        KeyCode::Char('o') => toggle_app_filter(app, FilterDimension::Sync, "OutOfSync"),
        KeyCode::Char('c') | KeyCode::Char('C') => {
            app.apps.filters.clear();
            app.apps.search.clear();
            app.reset_input();
            app.reproject_apps();
        }
        KeyCode::Char('R') => {
            app.toast("refreshing applications", ToastKind::Info);
            app.start_apps_fetch();
        }
        KeyCode::Char('S') => match selected {
            Some(name) => app.start_action(ActionKind::Sync, name),
            None => app.toast("no application selected", ToastKind::Warn),
        },
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => match selected {
            Some(name) => app.start_action(ActionKind::HardRefresh, name),
            None => app.toast("no application selected", ToastKind::Warn),
        },
        KeyCode::Char('r') => match selected {
            Some(name) => app.start_action(ActionKind::Refresh, name),
            None => app.toast("no application selected", ToastKind::Warn),
        },
        KeyCode::Char('D') => match selected {
            Some(name) => app.overlay = Overlay::ConfirmDelete(name),
            None => app.toast("no application selected", ToastKind::Warn),
        },
        _ => {}
    }
}

fn cycle_status(app: &mut ArgonautApp, dim: FilterDimension, options: &[&str]) {
    let next = next_status(options, app.tree.view.filters().get(dim)).unwrap_or("");
    app.tree.view.set_filter(dim, next);
    app.reproject_tree();
}

fn handle_tree_key(app: &mut ArgonautApp, key: KeyEvent) {
    let len = app.tree.rows.len();
    if move_cursor(&mut app.tree.selected, len, key.code) {
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if let Some(k) = app.selected_row().map(|r| r.key.clone()) {
                if let Err(e) = app.tree.view.toggle_node(&k) {
                    app.toast(e.to_string(), ToastKind::Warn);
                }
                app.reproject_tree();
            }
        }
        KeyCode::Esc | KeyCode::Char('b') => app.back(),
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        KeyCode::Char('t') => {
            app.tree.view.toggle_expansion_all();
            app.reproject_tree();
        }
        KeyCode::Char('/') | KeyCode::Char(':') => {
            let current = app.tree.view.search().to_string();
            open_search(app, current);
        }
        KeyCode::Char('f') | KeyCode::Char('F') => app.open_kind_menu(),
        KeyCode::Char('H') => cycle_status(app, FilterDimension::Health, &HEALTH_STATUSES),
        KeyCode::Char('Y') => cycle_status(app, FilterDimension::Sync, &SYNC_STATUSES),
        KeyCode::Char('C') => {
            app.tree.view.clear_filters();
            app.reproject_tree();
        }
        KeyCode::Char('R') => app.start_tree_fetch(argonaut_store::RebuildPolicy::PreserveExpansion),
        KeyCode::Char(c) if c.is_ascii_lowercase() => {
            if let Some(kind) = kind_for_shortcut(c) {
                let current = app.tree.view.filters().get(FilterDimension::Kind) == Some(kind);
                app.set_tree_kind(if current { None } else { Some(kind) });
            }
        }
        _ => {}
    }
}
