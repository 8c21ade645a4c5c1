//! # edge-module: Default implementations
//!
//! One default implementation for every `edge-core` trait, plus the
//! socket plumbing (listener setup, accepted connections) the server
//! loop drives.
//!
//! ## Default stack
//!
//! | Trait / concern     | Default Impl       |
//! |---------------------|--------------------|
//! | ReadinessMonitor    | EpollMonitor       |
//! | ByteSink            | StdoutSink         |
//! | BufferPool          | FixedBufferPool    |
//! | Notifier            | EventFdNotifier    |
//! | Listener setup      | listener::bind_listener |
//! | Shutdown signals    | signal::install_shutdown_signals |

pub mod buffer_pool;
pub mod memory_sink;
pub mod stdout_sink;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod sys;
        pub mod connection;
        pub mod epoll_monitor;
        pub mod eventfd_notifier;
        pub mod listener;
        pub mod signal;
    } else {
        compile_error!("edge-module requires Linux (epoll, eventfd, accept4)");
    }
}
