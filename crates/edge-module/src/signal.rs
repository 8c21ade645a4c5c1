//! SIGINT / SIGTERM → shutdown notifier.
//!
//! The handler only performs an eventfd `write`, which is
//! async-signal-safe. The event loop sees the notifier become readable
//! and winds down on its own thread.

use edge_core::error::{EdgeError, Result};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use crate::eventfd_notifier::{bump, EventFdNotifier};

static SIGNAL_FD: AtomicI32 = AtomicI32::new(-1);
/// Owner of the installed handlers. Keeps the eventfd open for as long
/// as the handler may fire.
static SIGNAL_NOTIFIER: Mutex<Option<Arc<EventFdNotifier>>> = Mutex::new(None);

extern "C" fn on_shutdown_signal(_sig: libc::c_int) {
    let fd = SIGNAL_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        let _ = bump(fd);
    }
}

/// Route SIGINT and SIGTERM to `notifier`.
///
/// Only the first notifier installed in a process is used; later calls
/// return `Ok(false)` without touching the handlers.
pub fn install_shutdown_signals(notifier: &Arc<EventFdNotifier>) -> Result<bool> {
    install_for(notifier, &[Signal::SIGINT, Signal::SIGTERM])
}

/// Install the handler for `signals`. On failure the handlers set so far
/// are reset to default and nothing is recorded, so a later call may
/// try again.
fn install_for(notifier: &Arc<EventFdNotifier>, signals: &[Signal]) -> Result<bool> {
    let mut owner = SIGNAL_NOTIFIER.lock().unwrap_or_else(|p| p.into_inner());
    if owner.is_some() {
        return Ok(false);
    }
    SIGNAL_FD.store(notifier.raw_fd(), Ordering::SeqCst);

    let action = SigAction::new(
        SigHandler::Handler(on_shutdown_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for (i, &sig) in signals.iter().enumerate() {
        // Safety: the handler only loads an atomic and calls write(2).
        if let Err(e) = unsafe { sigaction(sig, &action) } {
            reset_to_default(&signals[..i]);
            SIGNAL_FD.store(-1, Ordering::SeqCst);
            return Err(EdgeError::Notify(e));
        }
    }

    *owner = Some(Arc::clone(notifier));
    Ok(true)
}

fn reset_to_default(signals: &[Signal]) {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    for &sig in signals {
        // Safety: restoring the default disposition.
        let _ = unsafe { sigaction(sig, &default) };
    }
}
