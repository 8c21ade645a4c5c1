//! `EventFdNotifier`: default `Notifier` implementation.
//!
//! Writes to a non-blocking eventfd to wake the event loop. Multiple
//! `notify()` calls before the loop reads the eventfd coalesce into a
//! single readiness edge (eventfd counter semantics).

use edge_core::error::{EdgeError, Result};
use edge_core::notifier::Notifier;

use nix::errno::Errno;

use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};

pub struct EventFdNotifier {
    fd: OwnedFd,
}

impl EventFdNotifier {
    /// Create a new `EFD_NONBLOCK | EFD_CLOEXEC` eventfd. Closed on drop.
    pub fn create() -> Result<Self> {
        let fd = unsafe { libc::eventfd(0, libc::EFD_NONBLOCK | libc::EFD_CLOEXEC) };
        if fd < 0 {
            return Err(EdgeError::Notify(Errno::last()));
        }
        // Safety: eventfd returned a fresh descriptor we now own.
        Ok(Self { fd: unsafe { OwnedFd::from_raw_fd(fd) } })
    }

    /// Raw descriptor, for async-signal-safe writers (see `signal`).
    pub fn raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

/// Add 1 to the eventfd counter. Async-signal-safe.
pub(crate) fn bump(fd: RawFd) -> libc::ssize_t {
    let val: u64 = 1;
    unsafe {
        libc::write(
            fd,
            &val as *const u64 as *const libc::c_void,
            mem::size_of::<u64>(),
        )
    }
}

impl Notifier for EventFdNotifier {
    fn notify(&self) -> Result<()> {
        if bump(self.raw_fd()) < 0 {
            let errno = Errno::last();
            // Counter would overflow: a wakeup is already pending.
            if errno == Errno::EAGAIN {
                return Ok(());
            }
            return Err(EdgeError::Notify(errno));
        }
        Ok(())
    }

    fn drain(&self) -> Result<u64> {
        let mut val: u64 = 0;
        let ret = unsafe {
            libc::read(
                self.raw_fd(),
                &mut val as *mut u64 as *mut libc::c_void,
                mem::size_of::<u64>(),
            )
        };
        if ret < 0 {
            let errno = Errno::last();
            if errno == Errno::EAGAIN {
                return Ok(0);
            }
            return Err(EdgeError::Notify(errno));
        }
        Ok(val)
    }

    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}
