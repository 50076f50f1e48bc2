#![forbid(unsafe_code)]

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use crate::ArgonautApp;

const POLL: Duration = Duration::from_millis(100);

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Blocking UI loop. Must run inside a tokio runtime context since actions spawn tasks.
pub fn run_terminal(mut app: ArgonautApp) -> io::Result<()> {
    let mut guard = TerminalGuard::enter()?;
    info!("ui: terminal session started");
    loop {
        guard.terminal.draw(|f| app.render(f))?;
        if event::poll(POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        app.process_updates();
        app.tick(Instant::now());
        if app.should_quit() {
            break;
        }
    }
    info!("ui: terminal session ended");
    Ok(())
}
