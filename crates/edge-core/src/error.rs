//! Edgepoll error types.
//!
//! Startup errors (`Resolve`, `Bind`, `Listen`, `NonBlocking`, and
//! `Monitor` while setting up) are fatal to the process. Everything
//! raised while serving a connection is fatal to that connection only.

use nix::errno::Errno;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum EdgeError {
    /// getaddrinfo could not resolve the port selector.
    Resolve { port: String, reason: String },
    /// No resolved candidate could be opened and bound (last errno).
    Bind(Errno),
    /// listen() failed on the bound socket.
    Listen(Errno),
    /// Switching a descriptor to O_NONBLOCK failed.
    NonBlocking(Errno),
    /// Readiness monitor creation, registration or wait failed.
    Monitor(Errno),
    /// accept() failed with something other than would-block.
    Accept(Errno),
    /// read() failed with something other than would-block.
    Read(Errno),
    /// The byte sink rejected a write.
    SinkWrite(io::ErrorKind),
    /// Shutdown notifier could not be created or signalled.
    Notify(Errno),
}

impl EdgeError {
    /// Errors that end the process when raised during startup.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. } | Self::Bind(_) | Self::Listen(_) | Self::NonBlocking(_) | Self::Monitor(_)
        )
    }

    /// Wrap a failed sink write or record.
    pub fn sink_write(err: &io::Error) -> Self {
        Self::SinkWrite(err.kind())
    }
}

impl fmt::Display for EdgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve { port, reason } => write!(f, "getaddrinfo({}): {}", port, reason),
            Self::Bind(e) => write!(f, "could not bind: {}", e),
            Self::Listen(e) => write!(f, "listen: {}", e),
            Self::NonBlocking(e) => write!(f, "fcntl(O_NONBLOCK): {}", e),
            Self::Monitor(e) => write!(f, "epoll: {}", e),
            Self::Accept(e) => write!(f, "accept: {}", e),
            Self::Read(e) => write!(f, "read: {}", e),
            Self::SinkWrite(kind) => write!(f, "sink write: {}", kind),
            Self::Notify(e) => write!(f, "notifier: {}", e),
        }
    }
}

impl std::error::Error for EdgeError {}

pub type Result<T> = std::result::Result<T, EdgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_split() {
        assert!(EdgeError::Bind(Errno::EADDRINUSE).is_startup());
        assert!(EdgeError::Monitor(Errno::ENOMEM).is_startup());
        assert!(!EdgeError::Accept(Errno::EMFILE).is_startup());
        assert!(!EdgeError::Read(Errno::ECONNRESET).is_startup());
        assert!(!EdgeError::SinkWrite(io::ErrorKind::BrokenPipe).is_startup());
    }

    #[test]
    fn test_error_display() {
        let e = EdgeError::Resolve { port: "nope".into(), reason: "Servname not supported".into() };
        assert_eq!(format!("{}", e), "getaddrinfo(nope): Servname not supported");

        let e = EdgeError::SinkWrite(io::ErrorKind::WriteZero);
        assert!(format!("{}", e).starts_with("sink write:"));
    }

    #[test]
    fn test_sink_write_keeps_kind() {
        let io_err = io::Error::from(io::ErrorKind::BrokenPipe);
        match EdgeError::sink_write(&io_err) {
            EdgeError::SinkWrite(kind) => assert_eq!(kind, io::ErrorKind::BrokenPipe),
            other => panic!("unexpected {}", other),
        }
        assert!(!EdgeError::sink_write(&io_err).is_startup());
    }
}
