//! # edge-server: edge-triggered TCP log server
//!
//! Accepts TCP connections on a non-blocking listener and forwards every
//! byte they send, in order, to a `ByteSink`. One thread, one epoll
//! instance, every descriptor registered edge-triggered.
//!
//! ```rust,ignore
//! use edge_server::{EdgeServer, ServerConfig};
//!
//! let mut server = EdgeServer::bind("9000", ServerConfig::from_env())?;
//! server.shutdown_handle().install_signal_handlers()?;
//! let stats = server.run()?;
//! ```

pub mod config;
pub mod server;
pub mod stats;
mod slab;

pub use config::ServerConfig;
pub use server::{CloseReason, ConnState, EdgeServer, ShutdownHandle};
pub use stats::ServerStats;

pub use edge_core::error::{EdgeError, Result};
pub use edge_module::listener::PortSpec;
pub use edge_module::memory_sink::MemorySink;
