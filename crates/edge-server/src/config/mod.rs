//! Server configuration
//!
//! Library defaults with runtime environment overrides, then builder
//! calls on top.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder methods
//! 2. Environment variables (`from_env`)
//! 3. Library defaults (`defaults`)
//!
//! # Example
//!
//! ```rust,ignore
//! use edge_server::config::ServerConfig;
//!
//! let config = ServerConfig::from_env()
//!     .read_buffer_size(4096)
//!     .max_connections(1024);
//! ```

pub mod defaults;

use edge_core::env::{env_get, env_get_bool};
use edge_module::listener::ListenOptions;

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// listen() backlog
    pub backlog: i32,
    /// Bytes per read() while draining
    pub read_buffer_size: usize,
    /// Pooled read buffers
    pub buffer_pool_size: usize,
    /// Events per wait
    pub max_events: usize,
    /// Live connection cap
    pub max_connections: usize,
    /// SO_REUSEADDR on the listener
    pub reuse_address: bool,
    /// Period of stats lines from `run()`; `None` disables them
    pub stats_interval: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn interval_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

impl ServerConfig {
    /// Defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `EDGE_BACKLOG` - listen() backlog
    /// - `EDGE_READ_BUFFER_SIZE` - bytes per read()
    /// - `EDGE_BUFFER_POOL_SIZE` - pooled read buffers
    /// - `EDGE_MAX_EVENTS` - events per epoll_wait
    /// - `EDGE_MAX_CONNECTIONS` - live connection cap
    /// - `EDGE_REUSE_ADDR` - SO_REUSEADDR (0/1)
    /// - `EDGE_STATS_INTERVAL_SECS` - stats line period, 0 = off
    pub fn from_env() -> Self {
        Self {
            backlog: env_get("EDGE_BACKLOG", defaults::BACKLOG),
            read_buffer_size: env_get("EDGE_READ_BUFFER_SIZE", defaults::READ_BUFFER_SIZE),
            buffer_pool_size: env_get("EDGE_BUFFER_POOL_SIZE", defaults::BUFFER_POOL_SIZE),
            max_events: env_get("EDGE_MAX_EVENTS", defaults::MAX_EVENTS),
            max_connections: env_get("EDGE_MAX_CONNECTIONS", defaults::MAX_CONNECTIONS),
            reuse_address: env_get_bool("EDGE_REUSE_ADDR", defaults::REUSE_ADDRESS),
            stats_interval: interval_from_secs(env_get(
                "EDGE_STATS_INTERVAL_SECS",
                defaults::STATS_INTERVAL_SECS,
            )),
        }
        .sanitized()
    }

    /// Library defaults only, no environment. Useful for tests.
    pub fn new() -> Self {
        Self {
            backlog: defaults::BACKLOG,
            read_buffer_size: defaults::READ_BUFFER_SIZE,
            buffer_pool_size: defaults::BUFFER_POOL_SIZE,
            max_events: defaults::MAX_EVENTS,
            max_connections: defaults::MAX_CONNECTIONS,
            reuse_address: defaults::REUSE_ADDRESS,
            stats_interval: interval_from_secs(defaults::STATS_INTERVAL_SECS),
        }
    }

    /// Clamp sizes that would make the loop unable to progress.
    fn sanitized(mut self) -> Self {
        if self.backlog <= 0 {
            self.backlog = defaults::BACKLOG;
        }
        self.read_buffer_size = self.read_buffer_size.max(1);
        self.buffer_pool_size = self.buffer_pool_size.max(1);
        self.max_events = self.max_events.max(1);
        self.max_connections = self.max_connections.max(1);
        self
    }

    pub fn listen_options(&self) -> ListenOptions {
        ListenOptions {
            backlog: self.backlog,
            reuse_address: self.reuse_address,
        }
    }

    // Builder methods

    pub fn backlog(mut self, n: i32) -> Self {
        self.backlog = n;
        self.sanitized()
    }

    pub fn read_buffer_size(mut self, n: usize) -> Self {
        self.read_buffer_size = n;
        self.sanitized()
    }

    pub fn buffer_pool_size(mut self, n: usize) -> Self {
        self.buffer_pool_size = n;
        self.sanitized()
    }

    pub fn max_events(mut self, n: usize) -> Self {
        self.max_events = n;
        self.sanitized()
    }

    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = n;
        self.sanitized()
    }

    pub fn reuse_address(mut self, enable: bool) -> Self {
        self.reuse_address = enable;
        self
    }

    pub fn stats_interval(mut self, interval: Option<Duration>) -> Self {
        self.stats_interval = interval.filter(|d| !d.is_zero());
        self
    }
}
