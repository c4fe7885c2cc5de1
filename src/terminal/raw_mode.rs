//! Raw terminal mode management with panic-safe cleanup.

use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Tracks whether raw mode is active, for the panic handler.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard that restores the terminal to normal mode on drop.
///
/// Covers both normal exits and panics: a panic hook installed on entry
/// disables raw mode and re-shows the cursor before the panic message
/// prints, so an abrupt interruption never leaves the terminal broken.
pub struct RawModeGuard(());

impl RawModeGuard {
    /// Enter raw mode and return a guard that restores it on drop.
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
        // Best-effort cleanup during drop
        let _ = disable_raw_mode();
    }
}

fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);
    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if RAW_MODE_ACTIVE.load(Ordering::SeqCst) {
            let _ = crossterm::execute!(io::stdout(), crossterm::cursor::Show);
            let _ = disable_raw_mode();
            RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
        }
        original_hook(panic_info);
    }));
}
