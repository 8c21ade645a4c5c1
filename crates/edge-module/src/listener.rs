//! Listener setup.
//!
//! `bind_listener` resolves the port with `getaddrinfo(AI_PASSIVE,
//! AF_UNSPEC)` and tries each candidate in order until one binds. The
//! winning socket is switched to non-blocking and put in listening
//! state with the configured backlog.

use edge_core::error::{EdgeError, Result};
use edge_core::kdebug;

use nix::errno::Errno;

use std::ffi::{CStr, CString};
use std::fmt;
use std::mem;
use std::net::SocketAddr;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::ptr;

use crate::connection::ConnectionHandle;
use crate::sys;

/// Port selector: a numeric port or a service name from /etc/services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec(String);

impl PortSpec {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u16> for PortSpec {
    fn from(port: u16) -> Self {
        PortSpec(port.to_string())
    }
}

impl From<&str> for PortSpec {
    fn from(s: &str) -> Self {
        PortSpec(s.trim().to_string())
    }
}

impl From<String> for PortSpec {
    fn from(s: String) -> Self {
        PortSpec::from(s.as_str())
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ListenOptions {
    /// listen() backlog. Defaults to the platform maximum.
    pub backlog: i32,
    /// Set SO_REUSEADDR before bind.
    pub reuse_address: bool,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            backlog: libc::SOMAXCONN,
            reuse_address: true,
        }
    }
}

/// Owned `getaddrinfo` result list, freed on drop.
struct AddrInfoList(*mut libc::addrinfo);

impl AddrInfoList {
    fn resolve_passive(port: &PortSpec) -> Result<Self> {
        let resolve_err = |reason: String| EdgeError::Resolve {
            port: port.to_string(),
            reason,
        };
        let service = CString::new(port.as_str())
            .map_err(|_| resolve_err("port contains a NUL byte".into()))?;

        let mut hints: libc::addrinfo = unsafe { mem::zeroed() };
        hints.ai_family = libc::AF_UNSPEC;
        hints.ai_socktype = libc::SOCK_STREAM;
        hints.ai_flags = libc::AI_PASSIVE;

        let mut res: *mut libc::addrinfo = ptr::null_mut();
        let rc = unsafe { libc::getaddrinfo(ptr::null(), service.as_ptr(), &hints, &mut res) };
        if rc != 0 {
            let reason = unsafe { CStr::from_ptr(libc::gai_strerror(rc)) }
                .to_string_lossy()
                .into_owned();
            return Err(resolve_err(reason));
        }
        Ok(Self(res))
    }

    fn iter(&self) -> impl Iterator<Item = &libc::addrinfo> + '_ {
        let mut cur = self.0;
        std::iter::from_fn(move || {
            if cur.is_null() {
                return None;
            }
            // Safety: list nodes live until freeaddrinfo in Drop.
            let ai = unsafe { &*cur };
            cur = ai.ai_next;
            Some(ai)
        })
    }
}

impl Drop for AddrInfoList {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { libc::freeaddrinfo(self.0) };
        }
    }
}

/// Open and bind one candidate. The socket closes on any failure.
fn try_bind(ai: &libc::addrinfo, opts: &ListenOptions) -> nix::Result<OwnedFd> {
    let raw = unsafe {
        libc::socket(ai.ai_family, ai.ai_socktype | libc::SOCK_CLOEXEC, ai.ai_protocol)
    };
    let raw = Errno::result(raw)?;
    // Safety: socket() returned a fresh descriptor we now own.
    let fd = unsafe { OwnedFd::from_raw_fd(raw) };

    if opts.reuse_address {
        sys::set_reuse_addr(fd.as_raw_fd())?;
    }

    let ret = unsafe { libc::bind(fd.as_raw_fd(), ai.ai_addr, ai.ai_addrlen) };
    Errno::result(ret)?;
    Ok(fd)
}

/// Bind a non-blocking listening socket on every local interface.
///
/// Fails with `Resolve` when the port cannot be resolved, `Bind` when no
/// candidate binds (carrying the last candidate's errno), and
/// `NonBlocking` / `Listen` when the bound socket cannot be prepared.
pub fn bind_listener(port: impl Into<PortSpec>, opts: &ListenOptions) -> Result<ListenerHandle> {
    let port = port.into();
    let candidates = AddrInfoList::resolve_passive(&port)?;

    let mut last_err = Errno::EADDRNOTAVAIL;
    let mut bound = None;
    for ai in candidates.iter() {
        match try_bind(ai, opts) {
            Ok(fd) => {
                bound = Some(fd);
                break;
            }
            Err(e) => {
                kdebug!("bind candidate family={} failed: {}", ai.ai_family, e);
                last_err = e;
            }
        }
    }
    drop(candidates);

    let fd = bound.ok_or(EdgeError::Bind(last_err))?;

    sys::set_nonblocking(fd.as_raw_fd()).map_err(EdgeError::NonBlocking)?;

    let ret = unsafe { libc::listen(fd.as_raw_fd(), opts.backlog) };
    Errno::result(ret).map_err(EdgeError::Listen)?;

    let local_addr = sys::local_addr(fd.as_raw_fd()).map_err(EdgeError::Bind)?;

    Ok(ListenerHandle { fd, local_addr })
}

/// Bound, listening, non-blocking socket.
pub struct ListenerHandle {
    fd: OwnedFd,
    local_addr: SocketAddr,
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn descriptor(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    pub fn is_nonblocking(&self) -> bool {
        sys::is_nonblocking(self.fd.as_raw_fd()).unwrap_or(false)
    }

    /// Accept one pending connection.
    ///
    /// `Ok(None)` means the queue is exhausted (would block). The new
    /// descriptor is non-blocking and close-on-exec.
    pub fn accept(&self) -> Result<Option<ConnectionHandle>> {
        loop {
            let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
            let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

            let raw = unsafe {
                libc::accept4(
                    self.fd.as_raw_fd(),
                    &mut storage as *mut _ as *mut libc::sockaddr,
                    &mut len,
                    libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                )
            };
            if raw < 0 {
                match Errno::last() {
                    Errno::EINTR => continue,
                    Errno::EAGAIN => return Ok(None),
                    errno => return Err(EdgeError::Accept(errno)),
                }
            }

            // Safety: accept4 returned a fresh descriptor we now own.
            let fd = unsafe { OwnedFd::from_raw_fd(raw) };
            let peer = sys::sockaddr_to_std(&storage, len);
            return Ok(Some(ConnectionHandle::from_accepted(fd, peer)));
        }
    }
}

impl AsFd for ListenerHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("fd", &self.descriptor())
            .field("local_addr", &self.local_addr)
            .finish()
    }
}
