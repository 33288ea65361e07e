//! TUI runner: ratatui event loop with terminal setup and cleanup.
//!
//! The [`Tui`] struct owns the ratatui terminal and the application state
//! machine ([`App`]). It runs the main loop: draw frames, poll for keyboard
//! events, hand actions back to the app, and tick so background imports
//! complete and banners expire.

use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use tracing::info;

use crate::app::{App, AppAction, AppState, Key};
use crate::dashboard;
use crate::notification::{Notification, NotificationType};


const HELP_TEXT: &str = concat!(
    "Dashboard Help\n",
    "\n",
    "  h / Left    Previous page\n",
    "  l / Right   Next page\n",
    "  j / k       Select next/prev field\n",
    "  Enter       Edit field / commit edit\n",
    "  Tab         Commit edit and move to next field\n",
    "  Escape      Cancel edit\n",
    "  s           Save\n",
    "  e           Export to a dated JSON file\n",
    "  i           Import a JSON file\n",
    "  R           Reset to default values\n",
    "  ?           Show this help\n",
    "  q           Quit\n",
    "  Ctrl-C      Force quit\n",
);


/// Snapshot of all state needed for rendering a single frame.
///
/// Extracted from `Tui` so that `terminal.draw()` can borrow its closure
/// argument without conflicting with the `&mut self` borrow on the terminal.
struct RenderState<'a> {
    app: &'a App,
    now_ms: u64,
}


/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    tick_rate: Duration,
    last_tick: Instant,
}


impl Tui {
    /// Create a new TUI, entering raw mode and the alternate screen.
    pub fn new(app: App, tick_rate: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            app,
            tick_rate,
            last_tick: Instant::now(),
        })
    }

    /// Run the main event loop until quit is requested.
    pub fn run(&mut self) -> Result<(), io::Error> {
        info!(variant = %self.app.variant(), "dashboard started");
        loop {
            let state = RenderState {
                app: &self.app,
                now_ms: now_ms(),
            };
            self.terminal.draw(|frame| render_frame(frame, &state))?;

            let timeout = self
                .tick_rate
                .checked_sub(self.last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind == KeyEventKind::Press {
                        let key = crossterm_to_key(key_event.code, key_event.modifiers);
                        if let Some(action) = self.app.handle_key(key, now_ms()) {
                            if action == AppAction::Quit {
                                break;
                            }
                            self.app.perform(action, now_ms());
                        }
                    }
                }
            }

            if self.last_tick.elapsed() >= self.tick_rate {
                self.app.tick(now_ms());
                self.last_tick = Instant::now();
            }
        }

        info!("dashboard closed");
        self.shutdown()
    }

    /// Restore the terminal to its normal state.
    fn shutdown(&mut self) -> Result<(), io::Error> {
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}


impl Drop for Tui {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}


fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}


// ---------------------------------------------------------------------------
// Rendering (free functions to avoid borrow conflicts)
// ---------------------------------------------------------------------------

/// Render the full screen layout: page tabs, main content, status bar.
fn render_frame(frame: &mut Frame, state: &RenderState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // page tabs
            Constraint::Min(5),    // main content
            Constraint::Length(1), // prompt / status bar
        ])
        .split(frame.area());

    dashboard::render_tabs(frame, chunks[0], state.app);
    render_main(frame, chunks[1], state.app);
    render_status_bar(frame, chunks[2], state.app);

    if let Some(banner) = state.app.banner(state.now_ms) {
        render_banner(frame, chunks[1], banner);
    }
}

/// Dispatch main-area rendering based on the current app state.
fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    dashboard::render_dashboard(frame, area, app);
    match &app.state {
        AppState::Help => {
            let paragraph = Paragraph::new(HELP_TEXT)
                .block(Block::default().borders(Borders::ALL).title("Help"))
                .wrap(Wrap { trim: false });
            let popup = centered(area, 60, 19);
            frame.render_widget(Clear, popup);
            frame.render_widget(paragraph, popup);
        }
        AppState::Confirm { prompt, .. } => {
            let text = format!(
                "\n  {}\n\n  [y] Yes   [n] No   [Enter] Confirm   [Esc] Cancel\n",
                prompt,
            );
            let paragraph = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title("Confirm"))
                .wrap(Wrap { trim: false });
            let popup = centered(area, 80, 7);
            frame.render_widget(Clear, popup);
            frame.render_widget(paragraph, popup);
        }
        _ => {}
    }
}

/// Render the bottom bar: the import prompt, or mode and key hints.
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    if app.state == AppState::ImportPrompt {
        let label = "Import file: ";
        let width = area.width.saturating_sub(label.len() as u16) as usize;
        let (visible, cursor) = app.prompt().visible(width);
        frame.render_widget(
            Paragraph::new(format!("{}{}", label, visible)).style(Style::default().fg(Color::Cyan)),
            area,
        );
        frame.set_cursor_position((area.x + label.len() as u16 + cursor as u16, area.y));
        return;
    }

    let mut text = format!(" {} ", app.state.label());
    if app.store().is_busy() {
        text.push_str("| importing... ");
    } else if app.has_unsaved_changes() {
        text.push_str("| unsaved changes ");
    }
    text.push_str("| s save  e export  i import  R reset  ? help  q quit");
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::DarkGray)), area);
}

/// Render the banner as an overlay at the top of the main area.
fn render_banner(frame: &mut Frame, area: Rect, banner: &Notification) {
    let color = match banner.notification_type {
        NotificationType::Error => Color::Red,
        NotificationType::Success => Color::Green,
        NotificationType::Info => Color::Cyan,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let text = Paragraph::new(banner.body.clone())
        .block(block)
        .style(Style::default().fg(color));
    let banner_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 3.min(area.height),
    };
    frame.render_widget(Clear, banner_area);
    frame.render_widget(text, banner_area);
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}


// ---------------------------------------------------------------------------
// Key conversion
// ---------------------------------------------------------------------------

/// Convert a crossterm `KeyCode` + `KeyModifiers` into our domain `Key` type.
pub fn crossterm_to_key(code: KeyCode, modifiers: KeyModifiers) -> Key {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(ch) = code {
            return Key::Ctrl(ch);
        }
    }
    if modifiers.contains(KeyModifiers::ALT) {
        if let KeyCode::Char(ch) = code {
            return Key::Alt(ch);
        }
    }
    match code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Unknown,
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
