//! Readiness monitor abstraction.
//!
//! A `ReadinessMonitor` reports which registered descriptors allow
//! non-blocking I/O.
//!
//! # Implementors
//!
//! - `EpollMonitor` (default, Linux): `epoll_create1` / `epoll_ctl` /
//!   `epoll_wait`. Edge-triggered registrations map to `EPOLLET`.
//!
//! There is no `deregister`: closing the descriptor is the only way a
//! registration goes away. The kernel drops the epoll entry when the
//! last reference to the open file description is closed.

use crate::error::Result;
use crate::event::{EventBatch, Interest, Token};

use std::os::fd::BorrowedFd;
use std::time::Duration;

/// Readiness-notification context.
///
/// **Contract:**
/// - `register()` adds exactly one registration per descriptor.
/// - With `Interest::EDGE`, a notification fires only on a transition
///   to ready. The caller MUST drain the descriptor until it would block
///   before waiting again.
/// - `wait()` treats signal interruption as zero events, not an error.
pub trait ReadinessMonitor {
    /// Register `fd` under `token` with the given interest.
    fn register(&self, fd: BorrowedFd<'_>, token: Token, interest: Interest) -> Result<()>;

    /// Block until at least one descriptor is ready, the timeout expires
    /// (`None` = forever) or a signal interrupts the wait.
    ///
    /// Clears `batch`, fills it, and returns the number of events.
    fn wait(&mut self, batch: &mut EventBatch, timeout: Option<Duration>) -> Result<usize>;
}
