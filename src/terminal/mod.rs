//! Terminal display boundary.
//!
//! The session drives the screen through the [`Display`] trait: clear,
//! print, and a bounded single-key poll. The crossterm-backed
//! [`TerminalDisplay`] is the real implementation; tests substitute a
//! scripted double.

mod raw_mode;

pub use raw_mode::RawModeGuard;

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};

/// A key press as the session sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character key
    Char(char),
    /// The Enter key (help acknowledgment)
    Enter,
    /// Ctrl+C, delivered as a key event under raw mode
    Interrupt,
}

/// Boundary to the terminal.
pub trait Display {
    /// Clear the screen and home the cursor.
    fn clear(&mut self) -> io::Result<()>;
    /// Write a text block at the current position.
    fn print(&mut self, text: &str) -> io::Result<()>;
    /// Wait up to `timeout` for a single pending key press.
    ///
    /// This bounded wait doubles as the session's frame pacing.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}

/// Crossterm-backed terminal display.
///
/// Enters raw mode and hides the cursor on construction; both are
/// restored on drop (and by the raw-mode panic hook on abrupt exits).
pub struct TerminalDisplay {
    stdout: io::Stdout,
    /// Held for its drop: restores cooked mode when the display goes away
    _raw: RawModeGuard,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        let raw = RawModeGuard::enter()?;
        let mut stdout = io::stdout();
        execute!(stdout, Hide)?;
        Ok(Self { stdout, _raw: raw })
    }
}

impl Display for TerminalDisplay {
    fn clear(&mut self) -> io::Result<()> {
        queue!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        self.stdout.flush()
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        // Raw mode disables output post-processing, so LF alone does not
        // return the carriage.
        for line in text.split_inclusive('\n') {
            match line.strip_suffix('\n') {
                Some(body) => {
                    self.stdout.write_all(body.as_bytes())?;
                    self.stdout.write_all(b"\r\n")?;
                }
                None => self.stdout.write_all(line.as_bytes())?,
            }
        }
        self.stdout.flush()
    }

    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key_event) => Ok(map_key_event(key_event)),
            // Resize, focus, mouse: nothing for the session to do
            _ => Ok(None),
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show);
    }
}

/// Map a crossterm key event to a session [`Key`].
///
/// Only key presses count (release/repeat events on Windows are
/// ignored); Ctrl+C becomes [`Key::Interrupt`].
pub fn map_key_event(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Key::Interrupt),
            _ => None,
        };
    }
    match event.code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_map_plain_char() {
        let key = map_key_event(press(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(key, Some(Key::Char('q')));
    }

    #[test]
    fn test_map_enter() {
        let key = map_key_event(press(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(key, Some(Key::Enter));
    }

    #[test]
    fn test_map_ctrl_c_is_interrupt() {
        let key = map_key_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(key, Some(Key::Interrupt));
    }

    #[test]
    fn test_map_other_ctrl_chord_is_ignored() {
        let key = map_key_event(press(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(key, None);
    }

    #[test]
    fn test_map_function_key_is_ignored() {
        let key = map_key_event(press(KeyCode::F(1), KeyModifiers::NONE));
        assert_eq!(key, None);
    }
}
