//! `FixedBufferPool`: default `BufferPool` implementation.
//!
//! Pre-allocates `count` buffers of `buffer_size` bytes in a lock-free
//! bounded queue. An empty pool falls back to a fresh allocation; a full
//! pool drops returned buffers. No dynamic growth.

use edge_core::buffer::BufferPool;

use crossbeam_queue::ArrayQueue;

pub struct FixedBufferPool {
    queue: ArrayQueue<Vec<u8>>,
    buffer_size: usize,
}

impl FixedBufferPool {
    /// Pool of `count` buffers, each `buffer_size` bytes (both at least 1).
    pub fn new(count: usize, buffer_size: usize) -> Self {
        let count = count.max(1);
        let buffer_size = buffer_size.max(1);
        let queue = ArrayQueue::new(count);
        for _ in 0..count {
            let _ = queue.push(vec![0u8; buffer_size]);
        }
        Self { queue, buffer_size }
    }

    /// Maximum number of buffers the pool retains.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl BufferPool for FixedBufferPool {
    fn acquire(&self) -> Vec<u8> {
        self.queue
            .pop()
            .unwrap_or_else(|| vec![0u8; self.buffer_size])
    }

    fn release(&self, buf: Vec<u8>) {
        if buf.len() != self.buffer_size {
            return;
        }
        // Full pool: the extra buffer is simply freed.
        let _ = self.queue.push(buf);
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn available(&self) -> usize {
        self.queue.len()
    }
}
