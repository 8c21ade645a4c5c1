//! Library defaults for `ServerConfig`.

/// listen() backlog: the platform maximum.
pub const BACKLOG: i32 = libc::SOMAXCONN;

/// Bytes read per read() call while draining a connection.
pub const READ_BUFFER_SIZE: usize = 512;

/// Read buffers kept in the pool.
pub const BUFFER_POOL_SIZE: usize = 4;

/// Events reported per epoll_wait.
pub const MAX_EVENTS: usize = 64;

/// Live connections before new ones are closed on accept.
pub const MAX_CONNECTIONS: usize = 65536;

pub const REUSE_ADDRESS: bool = true;

/// Seconds between periodic stats lines; 0 disables them.
pub const STATS_INTERVAL_SECS: u64 = 0;
