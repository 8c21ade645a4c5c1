//! # edge-core: Trait definitions for edgepoll
//!
//! This crate defines the seams of the edge-triggered log server.
//! Each trait models one capability the event loop depends on;
//! `edge-module` provides the default implementation for every trait
//! and `edge-server` wires them together.
//!
//! | Trait               | Default Impl (edge-module) |
//! |---------------------|----------------------------|
//! | ReadinessMonitor    | EpollMonitor               |
//! | ByteSink            | StdoutSink / MemorySink    |
//! | BufferPool          | FixedBufferPool            |
//! | Notifier            | EventFdNotifier            |
//!
//! The crate also carries the ambient pieces shared by every other
//! crate: the error taxonomy, `kprint` logging macros and `env` helpers.

pub mod kprint;
pub mod env;
pub mod error;
pub mod event;
pub mod monitor;
pub mod sink;
pub mod buffer;
pub mod notifier;

pub use error::{EdgeError, Result};
pub use event::{Event, EventBatch, Interest, Readiness, Token};
