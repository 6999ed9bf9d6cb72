//! Ctrl-C outside the line editor.
//!
//! While `rustyline` reads, Ctrl-C arrives as a key and becomes
//! [`OrchestraError::Interrupted`] directly. At any other time the terminal
//! sends SIGINT to the whole foreground process group: the child running a
//! tool or admin command takes the default action, and the handler installed
//! here only records the press so the parent can unwind in order.

use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{OrchestraError, Result};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
const SIGINT: i32 = 2;

/// Install the process-wide handler. Call once, before any child runs.
pub fn install_handler() -> Result<()> {
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst)).map_err(|e| {
        OrchestraError::Input(format!("Failed to install Ctrl-C handler: {}", e))
    })
}

/// Consume a pending Ctrl-C, if any.
pub fn take() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// `Err(Interrupted)` if Ctrl-C was pressed since the last check.
pub fn check() -> Result<()> {
    if take() {
        Err(OrchestraError::Interrupted)
    } else {
        Ok(())
    }
}

/// Whether a finished child ended because of Ctrl-C: either the handler saw
/// the press or the child itself was killed by SIGINT.
pub fn child_interrupted(status: &ExitStatus) -> bool {
    let pressed = take();
    pressed || killed_by_sigint(status)
}

#[cfg(unix)]
fn killed_by_sigint(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn killed_by_sigint(_status: &ExitStatus) -> bool {
    false
}
