//! Accepted peer connections.
//!
//! A `ConnectionHandle` owns its descriptor. Dropping it (or calling
//! `close()`) closes the descriptor, which is also the only way its
//! readiness registration is removed.

use edge_core::error::{EdgeError, Result};

use nix::errno::Errno;

use std::fmt;
use std::net::{SocketAddr, TcpStream};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

use crate::sys;

/// Result of one non-blocking read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n > 0` bytes landed at the front of the buffer.
    Data(usize),
    /// Nothing left to read until the next readiness edge.
    WouldBlock,
    /// Peer closed its write side.
    Eof,
}

pub struct ConnectionHandle {
    fd: OwnedFd,
    peer: Option<SocketAddr>,
}

impl ConnectionHandle {
    /// Wrap a descriptor returned by accept4(SOCK_NONBLOCK).
    pub(crate) fn from_accepted(fd: OwnedFd, peer: Option<SocketAddr>) -> Self {
        Self { fd, peer }
    }

    /// Adopt an already connected std stream, switching it to non-blocking.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr().ok();
        let fd = OwnedFd::from(stream);
        sys::set_nonblocking(fd.as_raw_fd()).map_err(EdgeError::NonBlocking)?;
        Ok(Self { fd, peer })
    }

    /// Peer address, when the kernel reported an inet one.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn descriptor(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    pub fn is_nonblocking(&self) -> bool {
        sys::is_nonblocking(self.fd.as_raw_fd()).unwrap_or(false)
    }

    /// Read once into `buf`, retrying on EINTR.
    pub fn read_into(&self, buf: &mut [u8]) -> Result<ReadOutcome> {
        loop {
            let n = unsafe {
                libc::read(
                    self.fd.as_raw_fd(),
                    buf.as_mut_ptr() as *mut libc::c_void,
                    buf.len(),
                )
            };
            if n > 0 {
                return Ok(ReadOutcome::Data(n as usize));
            }
            if n == 0 {
                return Ok(ReadOutcome::Eof);
            }
            match Errno::last() {
                Errno::EINTR => continue,
                Errno::EAGAIN => return Ok(ReadOutcome::WouldBlock),
                errno => return Err(EdgeError::Read(errno)),
            }
        }
    }

    /// Close the connection, returning the descriptor number it had.
    pub fn close(self) -> RawFd {
        let fd = self.descriptor();
        drop(self);
        fd
    }
}

impl AsFd for ConnectionHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("fd", &self.descriptor())
            .field("peer", &self.peer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{Shutdown, TcpListener};

    fn pair() -> (TcpStream, ConnectionHandle) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, ConnectionHandle::from_stream(server).unwrap())
    }

    #[test]
    fn test_read_states() {
        let (mut client, conn) = pair();
        assert!(conn.is_nonblocking());
        assert_eq!(conn.peer_addr(), client.local_addr().ok());

        let mut buf = [0u8; 16];
        assert_eq!(conn.read_into(&mut buf).unwrap(), ReadOutcome::WouldBlock);

        client.write_all(b"hello").unwrap();
        let mut got = ReadOutcome::WouldBlock;
        for _ in 0..200 {
            got = conn.read_into(&mut buf).unwrap();
            if got != ReadOutcome::WouldBlock {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(got, ReadOutcome::Data(5));
        assert_eq!(&buf[..5], b"hello");

        client.shutdown(Shutdown::Write).unwrap();
        let mut got = ReadOutcome::WouldBlock;
        for _ in 0..200 {
            got = conn.read_into(&mut buf).unwrap();
            if got != ReadOutcome::WouldBlock {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(got, ReadOutcome::Eof);
    }

    #[test]
    fn test_close_returns_descriptor() {
        let (_client, conn) = pair();
        let fd = conn.descriptor();
        assert!(fd >= 0);
        assert_eq!(conn.close(), fd);
    }
}
