//! Cross-thread wakeup abstraction.
//!
//! A `Notifier` interrupts the event loop's blocking wait. The server
//! registers it alongside the listener and treats its readiness as a
//! shutdown request.
//!
//! # Implementors
//!
//! - `EventFdNotifier` (default): writes 1 to a non-blocking eventfd.

use crate::error::Result;

use std::os::fd::BorrowedFd;

/// Wakes the event loop.
///
/// **Contract:**
/// - `notify()` must NEVER block.
/// - Multiple calls before the loop wakes are coalesced.
pub trait Notifier: Send + Sync {
    /// Signal the loop.
    fn notify(&self) -> Result<()>;

    /// Consume pending notifications. Non-blocking.
    fn drain(&self) -> Result<u64>;

    /// Descriptor the loop registers with its readiness monitor.
    fn as_fd(&self) -> BorrowedFd<'_>;
}
