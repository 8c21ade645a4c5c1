//! `EpollMonitor`: default `ReadinessMonitor` implementation.
//!
//! Thin wrapper over `epoll_create1` / `epoll_ctl(EPOLL_CTL_ADD)` /
//! `epoll_wait`. The token travels in `epoll_event.u64`.
//!
//! Registrations are never removed explicitly. Dropping the registered
//! descriptor removes it from the interest list.

use edge_core::error::{EdgeError, Result};
use edge_core::event::{Event, EventBatch, Interest, Readiness, Token};
use edge_core::monitor::ReadinessMonitor;

use nix::errno::Errno;

use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::time::Duration;

pub struct EpollMonitor {
    epoll: OwnedFd,
    /// Kernel-facing event buffer, sized once at creation.
    raw: Vec<libc::epoll_event>,
}

impl EpollMonitor {
    /// Create an epoll instance able to report `max_events` per wait.
    pub fn new(max_events: usize) -> Result<Self> {
        let fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if fd < 0 {
            return Err(EdgeError::Monitor(Errno::last()));
        }
        // Safety: epoll_create1 returned a fresh descriptor we now own.
        let epoll = unsafe { OwnedFd::from_raw_fd(fd) };

        Ok(Self {
            epoll,
            raw: vec![libc::epoll_event { events: 0, u64: 0 }; max_events.max(1)],
        })
    }
}

fn interest_to_epoll(interest: Interest) -> u32 {
    let mut flags = 0u32;
    if interest.is_readable() {
        flags |= libc::EPOLLIN as u32;
    }
    if interest.is_edge() {
        flags |= libc::EPOLLET as u32;
    }
    flags
}

fn epoll_to_readiness(events: u32) -> Readiness {
    let mut r = Readiness::EMPTY;
    if events & libc::EPOLLIN as u32 != 0 {
        r = r | Readiness::READABLE;
    }
    if events & libc::EPOLLERR as u32 != 0 {
        r = r | Readiness::ERROR;
    }
    if events & (libc::EPOLLHUP | libc::EPOLLRDHUP) as u32 != 0 {
        r = r | Readiness::HANGUP;
    }
    r
}

/// Milliseconds for epoll_wait. Sub-millisecond timeouts round up so a
/// short timeout never turns into a busy poll.
fn timeout_ms(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => -1,
        Some(d) if d.is_zero() => 0,
        Some(d) => {
            let ms = d.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
            ms.max(1)
        }
    }
}

impl ReadinessMonitor for EpollMonitor {
    fn register(&self, fd: BorrowedFd<'_>, token: Token, interest: Interest) -> Result<()> {
        let mut event = libc::epoll_event {
            events: interest_to_epoll(interest),
            u64: token.0,
        };
        let ret = unsafe {
            libc::epoll_ctl(
                self.epoll.as_raw_fd(),
                libc::EPOLL_CTL_ADD,
                fd.as_raw_fd(),
                &mut event,
            )
        };
        Errno::result(ret).map(drop).map_err(EdgeError::Monitor)
    }

    fn wait(&mut self, batch: &mut EventBatch, timeout: Option<Duration>) -> Result<usize> {
        batch.clear();
        let max = batch.capacity().min(self.raw.len());

        let n = unsafe {
            libc::epoll_wait(
                self.epoll.as_raw_fd(),
                self.raw.as_mut_ptr(),
                max as libc::c_int,
                timeout_ms(timeout),
            )
        };

        if n < 0 {
            let errno = Errno::last();
            if errno == Errno::EINTR {
                return Ok(0);
            }
            return Err(EdgeError::Monitor(errno));
        }

        for ev in &self.raw[..n as usize] {
            // Copy out of the (packed on x86_64) struct before use.
            let events = ev.events;
            let data = ev.u64;
            batch.push(Event {
                token: Token(data),
                readiness: epoll_to_readiness(events),
            });
        }
        Ok(batch.len())
    }
}
