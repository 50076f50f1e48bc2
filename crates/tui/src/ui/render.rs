#![forbid(unsafe_code)]

use argonaut_core::columns::{application_cell, ColumnSpec, APPLICATION_COLUMNS, RESOURCE_COLUMNS};
use argonaut_core::RowTone;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::model::{FilterMenu, Overlay, Screen};
use crate::ui::menus::{kind_menu_label, ALL_KINDS, FILTER_ROOT_ITEMS};
use crate::ui::toasts::draw_toasts;
use crate::util::{centered, health_color, sync_color, tone_color};
use crate::ArgonautApp;

const KEY_COLOR: Color = Color::Rgb(1, 123, 233);

pub(crate) fn draw(frame: &mut Frame, app: &mut ArgonautApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3), Constraint::Length(1)])
        .split(frame.size());
    draw_header(frame, app, chunks[0]);
    match app.screen {
        Screen::InstanceSelect => draw_instances(frame, app, chunks[1]),
        Screen::AppList => draw_app_list(frame, app, chunks[1]),
        Screen::Tree => draw_tree(frame, app, chunks[1]),
    }
    draw_footer(frame, app, chunks[2]);
    draw_overlay(frame, app);
    draw_toasts(frame, app, chunks[1]);
}

fn key_span(k: &str) -> Span<'static> {
    Span::styled(k.to_string(), Style::default().fg(KEY_COLOR).add_modifier(Modifier::BOLD))
}

fn draw_header(frame: &mut Frame, app: &ArgonautApp, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    if app.screen == Screen::InstanceSelect {
        lines.push(Line::from(vec![key_span("Instances"), Span::raw(format!(": {}", app.config.instances.len()))]));
    } else {
        lines.push(Line::from(vec![key_span("URL"), Span::raw(format!(": {}", app.info.url))]));
        lines.push(Line::from(vec![key_span("Name"), Span::raw(format!(": {}", app.info.name))]));
        if let Some(a) = &app.info.app {
            lines.push(Line::from(vec![
                key_span("App"),
                Span::raw(format!(": {}  ", a.name)),
                key_span("Health"),
                Span::raw(": "),
                Span::styled(a.health.clone(), Style::default().fg(health_color(&a.health))),
                Span::raw("  "),
                key_span("Sync"),
                Span::raw(": "),
                Span::styled(a.sync.clone(), Style::default().fg(sync_color(&a.sync))),
            ]));
        }
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" argonaut ")),
        area,
    );
}

fn widths(cols: &[ColumnSpec]) -> Vec<Constraint> {
    let total: u32 = cols.iter().map(|c| c.width as u32).sum();
    cols.iter().map(|c| Constraint::Ratio(c.width as u32, total.max(1))).collect()
}

fn header_row(cols: &[ColumnSpec]) -> Row<'static> {
    Row::new(cols.iter().map(|c| Cell::from(c.label)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

fn highlight() -> Style { Style::default().add_modifier(Modifier::REVERSED) }

fn draw_instances(frame: &mut Frame, app: &ArgonautApp, area: Rect) {
    let items: Vec<ListItem> = app
        .config
        .instances
        .iter()
        .map(|i| ListItem::new(Line::from(vec![Span::styled(format!("{:<20}", i.name), Style::default().fg(Color::Cyan)), Span::raw(i.url.clone())])))
        .collect();
    let mut state = ListState::default().with_selected(Some(app.select.selected));
    frame.render_stateful_widget(
        List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Select instance "))
            .highlight_style(highlight()),
        area,
        &mut state,
    );
}

fn draw_app_list(frame: &mut Frame, app: &ArgonautApp, area: Rect) {
    let filtered = !app.apps.filters.is_empty() || !app.apps.search.is_empty();
    let title = if filtered {
        let mut parts = Vec::new();
        if !app.apps.filters.is_empty() {
            parts.push(app.apps.filters.description());
        }
        if !app.apps.search.is_empty() {
            parts.push(format!("search={}", app.apps.search));
        }
        format!(" Applications ({}) [{}/{}] ", parts.join(", "), app.apps.debug.after_search, app.apps.debug.total)
    } else {
        format!(" Applications [{}] ", app.apps.apps.len())
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    if !app.apps.loaded {
        frame.render_widget(Paragraph::new("Loading applications…").block(block), area);
        return;
    }
    let rows: Vec<Row> = app
        .apps
        .visible
        .iter()
        .map(|a| {
            let tone = RowTone::for_statuses(&a.health, &a.sync);
            Row::new(APPLICATION_COLUMNS.iter().map(|c| Cell::from(application_cell(a, c.kind).to_string())))
                .style(Style::default().fg(tone_color(tone)))
        })
        .collect();
    let mut state = TableState::default().with_selected(Some(app.apps.selected));
    frame.render_stateful_widget(
        Table::new(rows, widths(&APPLICATION_COLUMNS))
            .header(header_row(&APPLICATION_COLUMNS))
            .block(block)
            .highlight_style(highlight()),
        area,
        &mut state,
    );
}

fn draw_tree(frame: &mut Frame, app: &ArgonautApp, area: Rect) {
    let view = &app.tree.view;
    let mut title = format!(" Resources for {} ", app.tree.app);
    if !view.filters().is_empty() {
        title.push_str(&format!("({}) ", view.active_filters_description()));
    }
    if !view.search().is_empty() {
        title.push_str(&format!("[search: {}] ", view.search()));
    }
    let block = Block::default().borders(Borders::ALL).title(title);
    if !app.tree.loaded {
        frame.render_widget(Paragraph::new("Loading resources…").block(block), area);
        return;
    }
    let rows: Vec<Row> = app
        .tree
        .rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.kind_label()),
                Cell::from(r.name.clone()),
                Cell::from(r.health.clone()),
                Cell::from(r.sync.clone()),
                Cell::from(r.namespace.clone()),
            ])
            .style(Style::default().fg(tone_color(r.tone)))
        })
        .collect();
    let mut state = TableState::default().with_selected(Some(app.tree.selected));
    frame.render_stateful_widget(
        Table::new(rows, widths(&RESOURCE_COLUMNS))
            .header(header_row(&RESOURCE_COLUMNS))
            .block(block)
            .highlight_style(highlight()),
        area,
        &mut state,
    );
}

fn draw_footer(frame: &mut Frame, app: &ArgonautApp, area: Rect) {
    let line = if app.input.active {
        Line::from(vec![key_span("Search: "), Span::raw(format!("{}▏", app.input.text))])
    } else {
        let hints: &[(&str, &str)] = match app.screen {
            Screen::InstanceSelect => &[("Enter", "connect"), ("?", "help"), ("q", "quit")],
            Screen::AppList => &[("Enter", "resources"), ("/", "search"), ("f", "filter"), ("S", "sync"), ("D", "delete"), ("r", "refresh"), ("?", "help"), ("q", "quit")],
            Screen::Tree => &[("Enter", "toggle"), ("t", "expand all"), ("/", "search"), ("f", "kind"), ("H/Y", "status"), ("b", "back"), ("?", "help")],
        };
        let mut spans = Vec::new();
        for (k, v) in hints {
            spans.push(key_span(k));
            spans.push(Span::raw(format!(" {}  ", v)));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub(crate) fn help_lines(screen: Screen) -> Vec<(&'static str, &'static str)> {
    match screen {
        Screen::InstanceSelect => vec![("Up/Down", "Move"), ("Enter", "Connect to instance"), ("q", "Quit")],
        Screen::AppList => vec![
            ("Enter", "Open resource tree"),
            ("/", "Search"),
            ("f", "Filter menu"),
            ("h / p / d", "Health: Healthy / Progressing / Degraded"),
            ("s / o", "Sync: Synced / OutOfSync"),
            ("c", "Clear filters and search"),
            ("S", "Sync application"),
            ("D", "Delete application"),
            ("r", "Refresh application"),
            ("Ctrl-r", "Hard refresh application"),
            ("R", "Reload application list"),
            ("b / I", "Back to instances"),
            ("q", "Quit"),
        ],
        Screen::Tree => vec![
            ("Enter", "Expand / collapse node"),
            ("t", "Expand / collapse all"),
            ("/", "Search"),
            ("f", "Kind filter menu"),
            ("d s i c x p j r n a e", "Kind shortcuts"),
            ("H", "Cycle health filter"),
            ("Y", "Cycle sync filter"),
            ("C", "Clear filters"),
            ("R", "Reload resources"),
            ("b / Esc", "Back"),
            ("q", "Quit"),
        ],
    }
}

fn draw_overlay(frame: &mut Frame, app: &ArgonautApp) {
    let area = frame.size();
    match &app.overlay {
        Overlay::None => {}
        Overlay::Help => {
            let lines: Vec<Line> = help_lines(app.screen)
                .into_iter()
                .map(|(k, v)| Line::from(vec![key_span(&format!("{:<24}", k)), Span::raw(v)]))
                .collect();
            let rect = centered(area, 70, 70);
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help (any key closes) ")),
                rect,
            );
        }
        Overlay::Filter(FilterMenu::Root { cursor }) => {
            let title = format!(" Filter applications (current: {}) ", app.apps.filters.description());
            let items: Vec<String> = FILTER_ROOT_ITEMS.iter().map(|s| s.to_string()).collect();
            draw_menu(frame, area, &title, items, *cursor, "[a] all  [h] Healthy  [p] Progressing  [d] Degraded  [s] Synced  [o] OutOfSync");
        }
        Overlay::Filter(FilterMenu::Pick { dim, options, cursor }) => {
            let title = format!(" {} filter ", dim);
            draw_menu(frame, area, &title, options.clone(), *cursor, "Enter select  Esc back");
        }
        Overlay::KindMenu { kinds, cursor } => {
            let mut items = vec![format!("    {}", ALL_KINDS)];
            items.extend(kinds.iter().map(|k| kind_menu_label(k)));
            draw_menu(frame, area, " Filter by kind ", items, *cursor, "Enter select  letter shortcut  Esc close");
        }
        Overlay::ConfirmDelete(name) => {
            let rect = centered(area, 60, 20);
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(format!("Are you sure you want to delete application {}?", name)),
                    Line::from(""),
                    Line::from(vec![key_span("y"), Span::raw(" yes   "), key_span("n"), Span::raw(" no")]),
                ])
                .style(Style::default().bg(Color::Red).fg(Color::White))
                .block(Block::default().borders(Borders::ALL).title(" Delete ")),
                rect,
            );
        }
    }
}

fn draw_menu(frame: &mut Frame, area: Rect, title: &str, items: Vec<String>, cursor: usize, hint: &str) {
    let rect = centered(area, 60, 60);
    frame.render_widget(Clear, rect);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(Block::default().borders(Borders::ALL).inner(rect));
    frame.render_widget(Block::default().borders(Borders::ALL).title(title.to_string()), rect);
    let list_items: Vec<ListItem> = items.into_iter().map(ListItem::new).collect();
    let mut state = ListState::default().with_selected(Some(cursor));
    frame.render_stateful_widget(List::new(list_items).highlight_style(highlight()), parts[0], &mut state);
    frame.render_widget(Paragraph::new(hint.to_string()).style(Style::default().fg(Color::DarkGray)), parts[1]);
}
