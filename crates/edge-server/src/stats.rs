//! Loop counters.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// Connections returned by accept().
    pub accepted: u64,
    /// Connections closed for any reason (including rejected ones).
    pub closed: u64,
    /// Accepted connections closed at once because the slab was full.
    pub rejected: u64,
    /// Accept loop invocations (listener readiness edges).
    pub accept_batches: u64,
    /// Drain loop invocations that read from a connection.
    pub drain_passes: u64,
    /// Bytes successfully handed to the sink.
    pub bytes_forwarded: u64,
    /// Accept, registration, read and sink errors.
    pub errors: u64,
}

impl ServerStats {
    /// Connections accepted and not yet closed.
    pub fn live(&self) -> u64 {
        self.accepted.saturating_sub(self.closed)
    }
}

impl fmt::Display for ServerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "conns={} accepts={} closes={} rejected={} accept_batches={} drains={} bytes={} err={}",
            self.live(),
            self.accepted,
            self.closed,
            self.rejected,
            self.accept_batches,
            self.drain_passes,
            self.bytes_forwarded,
            self.errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_and_display() {
        let s = ServerStats { accepted: 5, closed: 2, bytes_forwarded: 10, ..Default::default() };
        assert_eq!(s.live(), 3);
        let line = format!("{}", s);
        assert!(line.starts_with("conns=3 accepts=5 closes=2"));
        assert!(line.contains("bytes=10"));
    }
}
