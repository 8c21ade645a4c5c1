//! `MemorySink`: in-memory `ByteSink`.
//!
//! Clones share the same buffers, so a test can hand one clone to the
//! server and inspect the other.

use edge_core::sink::ByteSink;

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    lines: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Captured>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        // Poisoned lock still holds valid captures.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every forwarded byte, in forward order.
    pub fn bytes(&self) -> Vec<u8> {
        self.lock().bytes.clone()
    }

    pub fn byte_len(&self) -> usize {
        self.lock().bytes.len()
    }

    /// Every recorded event line, in record order.
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    pub fn clear(&self) {
        let mut c = self.lock();
        c.bytes.clear();
        c.lines.clear();
    }
}

impl ByteSink for MemorySink {
    fn forward(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.lock().bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn record(&mut self, line: &str) -> io::Result<()> {
        self.lock().lines.push(line.to_string());
        Ok(())
    }
}
