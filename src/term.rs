use crate::TermInt;
use crate::snake::Cell;
use std::{io::{self, Stdout, Write, stdout}, time::Duration};
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::{debug, warn};

/// What the game needs from a terminal. Draw calls are queued and only
/// become visible on `flush`.
pub trait Screen {
    /// Viewport size as `(width, height)`.
    fn size(&self) -> (TermInt, TermInt);
    fn clear(&mut self) -> io::Result<()>;
    fn print_at(&mut self, pos: Cell, ch: char, color: Color) -> io::Result<()>;
    fn print_text(&mut self, row: TermInt, col: TermInt, text: &str, color: Color, bold: bool) -> io::Result<()>;
    /// Waits up to `timeout` for a key press; `None` on timeout.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;
    fn flush(&mut self) -> io::Result<()>;
    /// Set once SIGINT or SIGTERM has been delivered.
    fn interrupted(&self) -> bool;
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    active: bool,
    interrupt: Arc<AtomicBool>,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let interrupt = Arc::new(AtomicBool::new(false));
        register_signals(&interrupt)?;

        debug!(width, height, "terminal size");
        Ok(TermManager { width, height, stdout: stdout(), active: false, interrupt })
    }

    pub fn setup(&mut self) -> io::Result<()> {
        // Mark active first so a failure halfway through still gets undone on drop
        self.active = true;
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
    }

    /// Puts the terminal back the way we found it. Safe to call twice.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let raw = terminal::disable_raw_mode();
        execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )?;
        raw
    }
}

impl Screen for TermManager {
    fn size(&self) -> (TermInt, TermInt) {
        (self.width, self.height)
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    fn print_at(&mut self, pos: Cell, ch: char, color: Color) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.col, pos.row), style::PrintStyledContent(ch.with(color)))
    }

    fn print_text(&mut self, row: TermInt, col: TermInt, text: &str, color: Color, bold: bool) -> io::Result<()> {
        let styled = if bold { text.with(color).bold() } else { text.with(color) };
        queue!(self.stdout, cursor::MoveTo(col, row), style::PrintStyledContent(styled))
    }

    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            // Some platforms report releases as well; only presses steer
            if let Event::Key(ev) = event::read()? {
                if ev.kind != KeyEventKind::Release {
                    return Ok(Some(ev));
                }
            }
        }

        Ok(None)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(%err, "failed to restore terminal");
        }
    }
}

#[cfg(unix)]
fn register_signals(flag: &Arc<AtomicBool>) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};

    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(flag))?;
    }

    Ok(())
}

#[cfg(not(unix))]
fn register_signals(_flag: &Arc<AtomicBool>) -> io::Result<()> {
    // Ctrl+C still reaches us as a key event in raw mode
    Ok(())
}
