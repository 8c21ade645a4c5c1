//! Byte sink abstraction.
//!
//! A `ByteSink` receives everything the server reads from its
//! connections, plus the human-readable accept/close lines.
//!
//! # Implementors
//!
//! - `StdoutSink` (default): process standard output.
//! - `MemorySink`: shared in-memory buffer, for tests and embedding.

use std::io;

/// Destination for forwarded connection bytes.
///
/// **Contract:**
/// - `forward()` writes all of `bytes` or fails. A failure is charged to
///   the connection that produced the bytes, never to the server.
/// - Calls arrive in read order for any one connection.
pub trait ByteSink {
    /// Write `bytes` verbatim.
    fn forward(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Write one event line (a trailing newline is appended).
    fn record(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered output, if any.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn forward(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).forward(bytes)
    }

    fn record(&mut self, line: &str) -> io::Result<()> {
        (**self).record(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
