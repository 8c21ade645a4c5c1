//! `StdoutSink`: default `ByteSink` implementation.
//!
//! Forwarded bytes and event lines both go to standard output and are
//! flushed immediately, so a peer's bytes show up without waiting for
//! a newline.

use edge_core::sink::ByteSink;

use std::io::{self, Write};

pub struct StdoutSink {
    out: io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Write all of `bytes`.
///
/// `Interrupted` and `WouldBlock` (stdout may be a non-blocking pipe)
/// are retried; a zero-length write is `WriteZero`.
pub fn write_fully<W: Write>(w: &mut W, mut bytes: &[u8]) -> io::Result<()> {
    while !bytes.is_empty() {
        match w.write(bytes) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => bytes = &bytes[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => std::thread::yield_now(),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

impl ByteSink for StdoutSink {
    fn forward(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut out = self.out.lock();
        write_fully(&mut out, bytes)?;
        out.flush()
    }

    fn record(&mut self, line: &str) -> io::Result<()> {
        let mut out = self.out.lock();
        write_fully(&mut out, line.as_bytes())?;
        write_fully(&mut out, b"\n")?;
        out.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.lock().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts at most `chunk` bytes per call and fails every other call
    /// with a retryable error.
    struct Choppy {
        data: Vec<u8>,
        chunk: usize,
        calls: usize,
    }

    impl Write for Choppy {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let n = buf.len().min(self.chunk);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_short_writes_complete() {
        let mut w = Choppy { data: Vec::new(), chunk: 3, calls: 0 };
        write_fully(&mut w, b"hello world").unwrap();
        assert_eq!(w.data, b"hello world");
    }

    #[test]
    fn test_zero_write_is_error() {
        let err = write_fully(&mut Closed, b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn test_empty_is_noop() {
        write_fully(&mut Closed, b"").unwrap();
    }
}
