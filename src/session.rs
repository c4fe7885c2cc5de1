//! Interactive session controller.
//!
//! Owns the only long-lived mutable state in the system and runs the
//! cooperative single-threaded loop: read a frame, mirror, apply the
//! contrast pre-filter, render through the pipeline, print, poll one
//! key, dispatch. The bounded key poll is also the frame pacing; there
//! is no separate rate limiter.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

use crate::ascii::{self, TARGET_WIDTH};
use crate::camera::{apply_contrast, mirror_horizontal, CameraError, FrameSource};
use crate::terminal::{Display, Key};

/// Bounded wait for one pending key per cycle.
pub const KEY_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Session mode. `Terminated` is final; nothing transitions out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Running,
    /// Displaying help, waiting for acknowledgment
    Paused,
    Terminated,
}

/// Mutable session state, owned and mutated only by the controller.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// User contrast bias in [0, 100], default 50
    pub contrast_bias: u8,
    /// Cycles completed, also names snapshots
    pub frame_counter: u64,
    pub mode: Mode,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            contrast_bias: 50,
            frame_counter: 0,
            mode: Mode::Running,
        }
    }
}

impl SessionState {
    pub fn contrast_up(&mut self) {
        self.contrast_bias = (self.contrast_bias + 5).min(100);
    }

    pub fn contrast_down(&mut self) {
        self.contrast_bias = self.contrast_bias.saturating_sub(5);
    }

    pub fn contrast_reset(&mut self) {
        self.contrast_bias = 50;
    }
}

/// What a dispatched key asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Save,
    ContrastUp,
    ContrastDown,
    ContrastReset,
    Help,
    /// Unrecognized key: no-op, remain running
    None,
}

/// Interactive key bindings: `q` quit, `s` save, `c` contrast+5,
/// `x` contrast-5, `r` reset, `h` help. Ctrl+C quits like `q`.
pub fn dispatch_key(key: Key) -> KeyAction {
    match key {
        Key::Char('q') | Key::Interrupt => KeyAction::Quit,
        Key::Char('s') => KeyAction::Save,
        Key::Char('c') => KeyAction::ContrastUp,
        Key::Char('x') => KeyAction::ContrastDown,
        Key::Char('r') => KeyAction::ContrastReset,
        Key::Char('h') => KeyAction::Help,
        _ => KeyAction::None,
    }
}

/// Errors that end the session abnormally.
///
/// Camera failures never surface here; they transition the state
/// machine to `Terminated` instead. Only a broken display is fatal.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("display error: {0}")]
    Display(#[from] io::Error),
}

/// Session configuration fixed at construction time.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Working width of the glyph grid in characters
    pub target_width: u32,
    /// Mirror frames horizontally (selfie view)
    pub mirror: bool,
    /// Directory snapshots are written into
    pub snapshot_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_width: TARGET_WIDTH,
            mirror: true,
            snapshot_dir: PathBuf::from("."),
        }
    }
}

const BANNER: &str = "\
ASCII Camera Started
===========================================================================
CONTROLS: q=quit | s=save | c=more contrast | x=less contrast | r=reset
===========================================================================
";

const HELP_TEXT: &str = "\
===========================================================================
CONTROLS:
  q - Quit
  s - Save current frame
  c - Increase contrast
  x - Decrease contrast
  r - Reset to default
  h - Show this help
===========================================================================
Press Enter to continue...
";

/// The interactive session state machine.
pub struct Session<S: FrameSource, D: Display> {
    source: S,
    display: D,
    config: SessionConfig,
    state: SessionState,
    /// Most recent successfully rendered frame, for snapshots
    last_render: Option<String>,
}

impl<S: FrameSource, D: Display> Session<S, D> {
    pub fn new(source: S, display: D, config: SessionConfig) -> Self {
        Self {
            source,
            display,
            config,
            state: SessionState::default(),
            last_render: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Run cycles until the session terminates.
    ///
    /// Always releases the frame source on the way out, including when
    /// the display fails mid-loop.
    pub fn run(&mut self) -> Result<(), SessionError> {
        let result = self.run_loop();
        self.state.mode = Mode::Terminated;
        self.source.release();
        info!("session terminated after {} frames", self.state.frame_counter);
        result
    }

    fn run_loop(&mut self) -> Result<(), SessionError> {
        self.display.print(BANNER)?;
        while self.state.mode != Mode::Terminated {
            self.cycle()?;
        }
        Ok(())
    }

    /// One cycle of the running state.
    fn cycle(&mut self) -> Result<(), SessionError> {
        match self.source.read() {
            // A malformed frame is recoverable: skip the cycle before the
            // pre-filters index into the buffer.
            Ok(Some(frame)) if frame.data.len() < frame.expected_len() => {
                warn!(
                    "skipping frame {}: short pixel buffer",
                    self.state.frame_counter
                );
            }
            Ok(Some(mut frame)) => {
                if self.config.mirror {
                    mirror_horizontal(&mut frame);
                }
                apply_contrast(&mut frame, self.state.contrast_bias);

                match ascii::render_frame(&frame, self.config.target_width) {
                    Ok(text) => {
                        let status = self.status_line();
                        self.display.clear()?;
                        self.display.print(&text)?;
                        self.display.print(&status)?;
                        self.last_render = Some(text);
                    }
                    Err(e) => {
                        // Recoverable: skip this frame, keep the session alive
                        warn!("skipping frame {}: {}", self.state.frame_counter, e);
                    }
                }
            }
            Ok(None) => {
                info!("frame source ended");
                self.state.mode = Mode::Terminated;
                return Ok(());
            }
            Err(CameraError::DecodeFailed) => {
                warn!("undecodable frame {}, skipping", self.state.frame_counter);
            }
            Err(e) => {
                warn!("frame source failed: {}", e);
                self.state.mode = Mode::Terminated;
                return Ok(());
            }
        }

        if let Some(key) = self.display.poll_key(KEY_POLL_TIMEOUT)? {
            self.handle_action(dispatch_key(key))?;
        }

        // Unconditional, even on save/help detours
        self.state.frame_counter += 1;
        Ok(())
    }

    fn handle_action(&mut self, action: KeyAction) -> Result<(), SessionError> {
        match action {
            KeyAction::Quit => self.state.mode = Mode::Terminated,
            KeyAction::Save => self.save_snapshot()?,
            KeyAction::ContrastUp => self.state.contrast_up(),
            KeyAction::ContrastDown => self.state.contrast_down(),
            KeyAction::ContrastReset => self.state.contrast_reset(),
            KeyAction::Help => self.show_help()?,
            KeyAction::None => {}
        }
        Ok(())
    }

    fn status_line(&self) -> String {
        format!(
            "Frame: {:04} | Contrast: {:3} | 'h'=help\n",
            self.state.frame_counter, self.state.contrast_bias
        )
    }

    /// Write the current rendered frame as plain text, named from the
    /// frame counter. A write failure is reported inline and does not
    /// alter session state.
    fn save_snapshot(&mut self) -> Result<(), SessionError> {
        let Some(text) = &self.last_render else {
            self.display.print("No frame to save yet\n")?;
            return Ok(());
        };

        let filename = format!("ascii_face_{:04}.txt", self.state.frame_counter);
        let path = self.config.snapshot_dir.join(&filename);
        match std::fs::write(&path, text) {
            Ok(()) => {
                info!("snapshot written to {}", path.display());
                self.display.print(&format!("Saved: {}\n", filename))?;
            }
            Err(e) => {
                warn!("snapshot write failed: {}", e);
                self.display.print(&format!("Save failed: {}\n", e))?;
            }
        }
        Ok(())
    }

    /// Pause on the help screen until the user acknowledges with Enter.
    fn show_help(&mut self) -> Result<(), SessionError> {
        self.state.mode = Mode::Paused;
        self.display.print(HELP_TEXT)?;

        loop {
            match self.display.poll_key(Duration::from_millis(250))? {
                Some(Key::Enter) => break,
                Some(Key::Interrupt) => {
                    self.state.mode = Mode::Terminated;
                    return Ok(());
                }
                _ => {}
            }
        }

        self.state.mode = Mode::Running;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_up_clamps_at_100() {
        let mut state = SessionState::default();
        for _ in 0..11 {
            state.contrast_up();
            assert!(state.contrast_bias <= 100);
        }
        assert_eq!(state.contrast_bias, 100);
    }

    #[test]
    fn test_contrast_down_clamps_at_0() {
        let mut state = SessionState::default();
        for _ in 0..11 {
            state.contrast_down();
        }
        assert_eq!(state.contrast_bias, 0);
    }

    #[test]
    fn test_contrast_reset() {
        let mut state = SessionState::default();
        state.contrast_up();
        state.contrast_up();
        state.contrast_reset();
        assert_eq!(state.contrast_bias, 50);
    }

    #[test]
    fn test_dispatch_bindings() {
        assert_eq!(dispatch_key(Key::Char('q')), KeyAction::Quit);
        assert_eq!(dispatch_key(Key::Interrupt), KeyAction::Quit);
        assert_eq!(dispatch_key(Key::Char('s')), KeyAction::Save);
        assert_eq!(dispatch_key(Key::Char('c')), KeyAction::ContrastUp);
        assert_eq!(dispatch_key(Key::Char('x')), KeyAction::ContrastDown);
        assert_eq!(dispatch_key(Key::Char('r')), KeyAction::ContrastReset);
        assert_eq!(dispatch_key(Key::Char('h')), KeyAction::Help);
        assert_eq!(dispatch_key(Key::Char('z')), KeyAction::None);
        assert_eq!(dispatch_key(Key::Enter), KeyAction::None);
    }
}
