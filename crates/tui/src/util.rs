#![forbid(unsafe_code)]

use argonaut_core::RowTone;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;

pub(crate) const ORANGE: Color = Color::Rgb(255, 165, 0);

pub(crate) fn tone_color(tone: RowTone) -> Color {
    match tone {
        RowTone::Healthy => Color::Green,
        RowTone::Progressing | RowTone::OutOfSync => ORANGE,
        RowTone::Degraded => Color::Red,
        RowTone::Suspended => Color::Blue,
        RowTone::Missing => Color::DarkGray,
        RowTone::Neutral => Color::White,
    }
}

pub(crate) fn health_color(health: &str) -> Color {
    tone_color(RowTone::for_health(health))
}

pub(crate) fn sync_color(sync: &str) -> Color {
    if sync.eq_ignore_ascii_case("synced") {
        Color::Green
    } else if sync.eq_ignore_ascii_case("outofsync") {
        ORANGE
    } else {
        Color::White
    }
}

/// Rect of `pct_x` by `pct_y` percent centred in `area`.
pub(crate) fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(v[1])[1]
}

/// Keep a cursor inside `len` items.
pub(crate) fn clamp(sel: usize, len: usize) -> usize {
    if len == 0 { 0 } else { sel.min(len - 1) }
}

pub(crate) fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}
