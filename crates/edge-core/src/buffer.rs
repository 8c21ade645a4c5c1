//! Read buffer management abstraction.
//!
//! A `BufferPool` hands out reusable read buffers so the drain loop
//! does not allocate per read.
//!
//! # Implementors
//!
//! - `FixedBufferPool` (default): pre-allocates a fixed number of
//!   buffers in a lock-free queue. Falls back to a fresh allocation
//!   when the pool is empty.

/// Manages read buffer lifecycle.
///
/// **Contract:**
/// - `acquire()` always returns a buffer of exactly `buffer_size()` bytes.
/// - `release()` returns a buffer to the pool. Buffers of the wrong size
///   or beyond the pool's capacity are dropped.
pub trait BufferPool {
    /// Take a buffer of `buffer_size()` bytes.
    fn acquire(&self) -> Vec<u8>;

    /// Give a buffer back.
    fn release(&self, buf: Vec<u8>);

    /// Size of every buffer handed out.
    fn buffer_size(&self) -> usize;

    /// Number of buffers currently pooled.
    fn available(&self) -> usize;
}
