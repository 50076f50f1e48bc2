#![forbid(unsafe_code)]

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::model::{Toast, ToastKind};
use crate::ArgonautApp;

const MAX_VISIBLE: usize = 3;

impl ArgonautApp {
    pub(crate) fn toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        let dur = match kind { ToastKind::Error => 5000, ToastKind::Warn => 4000, _ => 3000 };
        self.toasts.push(Toast { text: text.into(), kind, created: Instant::now(), duration_ms: dur });
    }

    pub(crate) fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| now.saturating_duration_since(t.created).as_millis() < t.duration_ms as u128);
    }
}

fn kind_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Info => Color::Cyan,
        ToastKind::Success => Color::Green,
        ToastKind::Warn => Color::Yellow,
        ToastKind::Error => Color::Red,
    }
}

/// Newest toasts stacked bottom-right above the footer.
pub(crate) fn draw_toasts(frame: &mut Frame, app: &ArgonautApp, area: Rect) {
    let width = area.width.min(60);
    let mut bottom = area.bottom().saturating_sub(1);
    for t in app.toasts.iter().rev().take(MAX_VISIBLE) {
        let height = 3u16;
        if bottom < area.y + height {
            break;
        }
        let rect = Rect::new(area.right().saturating_sub(width + 1), bottom - height, width, height);
        let color = kind_color(t.kind);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(t.text.as_str())
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color))),
            rect,
        );
        bottom -= height;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::ToastKind;

    #[test]
    fn lifetimes_depend_on_kind() {
        let mut app = crate::ui::tests_support::empty_app();
        app.toast("a", ToastKind::Info);
        app.toast("b", ToastKind::Warn);
        app.toast("c", ToastKind::Error);
        let durations: Vec<u64> = app.toasts.iter().map(|t| t.duration_ms).collect();
        assert_eq!(durations, vec![3000, 4000, 5000]);
        let now = Instant::now();
        app.expire_toasts(now + Duration::from_millis(4500));
        assert_eq!(app.toasts.len(), 1);
        assert_eq!(app.toasts[0].text, "c");
    }
}
