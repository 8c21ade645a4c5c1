//! # EdgeServer: the edge-triggered event loop
//!
//! One server value holds the whole loop state: listener, readiness
//! monitor, connection slab, read buffer pool, sink and shutdown
//! notifier. Nothing is global, so independent servers can run side by
//! side in one process.
//!
//! Every registration is edge-triggered. Both loops below therefore
//! run until the kernel says "would block":
//!
//! - `accept_ready` accepts until EAGAIN,
//! - `drain_connection` reads until EAGAIN (or EOF / error).
//!
//! Leaving either loop early loses wakeups for data or connections
//! that are already queued.

use edge_core::buffer::BufferPool;
use edge_core::error::{EdgeError, Result};
use edge_core::event::{Event, EventBatch, Interest, Readiness, Token};
use edge_core::monitor::ReadinessMonitor;
use edge_core::notifier::Notifier;
use edge_core::sink::ByteSink;
use edge_core::{kdebug, kerror, kinfo, ktrace, kwarn};

use edge_module::buffer_pool::FixedBufferPool;
use edge_module::connection::{ConnectionHandle, ReadOutcome};
use edge_module::epoll_monitor::EpollMonitor;
use edge_module::eventfd_notifier::EventFdNotifier;
use edge_module::listener::{bind_listener, ListenerHandle, PortSpec};
use edge_module::signal::install_shutdown_signals;
use edge_module::stdout_sink::StdoutSink;

use std::net::SocketAddr;
use std::os::fd::AsFd;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ServerConfig;
use crate::slab::ConnSlab;
use crate::stats::ServerStats;

/// Why a connection was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// read() returned 0.
    Eof,
    /// read() failed with something other than EAGAIN.
    ReadError,
    /// The monitor reported error/hangup with nothing to read.
    Fault,
    /// The sink refused the connection's bytes.
    SinkFailed,
    /// Registration with the monitor failed right after accept.
    RegisterFailed,
    /// Accepted while the slab was full.
    Rejected,
}

/// Connection state after a drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Drained to EAGAIN; waiting for the next edge.
    Open,
    Closed(CloseReason),
}

/// Stops a running server from any thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    notifier: Arc<EventFdNotifier>,
}

impl ShutdownHandle {
    /// Ask the loop to stop. Returns immediately.
    pub fn shutdown(&self) -> Result<()> {
        self.notifier.notify()
    }

    /// Route SIGINT / SIGTERM to this handle. `Ok(false)` when another
    /// server already owns the signal handlers.
    pub fn install_signal_handlers(&self) -> Result<bool> {
        install_shutdown_signals(&self.notifier)
    }
}

pub struct EdgeServer<S: ByteSink = StdoutSink, M: ReadinessMonitor = EpollMonitor> {
    config: ServerConfig,
    listener: ListenerHandle,
    monitor: M,
    batch: EventBatch,
    conns: ConnSlab<ConnectionHandle>,
    pool: FixedBufferPool,
    sink: S,
    shutdown: Arc<EventFdNotifier>,
    stats: ServerStats,
    stopped: bool,
}

impl EdgeServer<StdoutSink, EpollMonitor> {
    /// Bind `port` and forward everything to standard output.
    pub fn bind(port: impl Into<PortSpec>, config: ServerConfig) -> Result<Self> {
        Self::bind_with_sink(port, config, StdoutSink::new())
    }
}

impl<S: ByteSink> EdgeServer<S, EpollMonitor> {
    /// Bind `port` and forward everything to `sink`.
    ///
    /// The monitor is only created once the listener is bound, so a bind
    /// failure leaves nothing behind.
    pub fn bind_with_sink(port: impl Into<PortSpec>, config: ServerConfig, sink: S) -> Result<Self> {
        let listener = bind_listener(port, &config.listen_options())?;
        let monitor = EpollMonitor::new(config.max_events)?;
        Self::from_parts(listener, monitor, sink, config)
    }
}

impl<S: ByteSink, M: ReadinessMonitor> EdgeServer<S, M> {
    /// Assemble a server from an already bound listener and a monitor.
    ///
    /// Registers the listener and the shutdown notifier; failure here is
    /// a startup error.
    pub fn from_parts(listener: ListenerHandle, monitor: M, sink: S, config: ServerConfig) -> Result<Self> {
        let shutdown = Arc::new(EventFdNotifier::create()?);
        let edge_read = Interest::READABLE | Interest::EDGE;

        monitor.register(listener.as_fd(), Token::LISTENER, edge_read)?;
        monitor.register(Notifier::as_fd(&*shutdown), Token::SHUTDOWN, edge_read)?;

        Ok(Self {
            batch: EventBatch::with_capacity(config.max_events),
            conns: ConnSlab::new(config.max_connections),
            pool: FixedBufferPool::new(config.buffer_pool_size, config.read_buffer_size),
            config,
            listener,
            monitor,
            sink,
            shutdown,
            stats: ServerStats::default(),
            stopped: false,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    /// Live connections currently registered.
    pub fn connection_count(&self) -> usize {
        self.conns.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            notifier: Arc::clone(&self.shutdown),
        }
    }

    /// True once a shutdown request has been processed.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Run until a shutdown request arrives.
    ///
    /// Only monitor failures escape; every per-connection failure is
    /// handled inside the loop.
    pub fn run(&mut self) -> Result<ServerStats> {
        kinfo!(
            "listening on {} (descriptor {}, backlog {})",
            self.local_addr(),
            self.listener.descriptor(),
            self.config.backlog
        );

        let interval = self.config.stats_interval;
        let mut last_stats = Instant::now();

        while !self.stopped {
            self.poll_once(interval)?;

            if let Some(every) = interval {
                if last_stats.elapsed() >= every {
                    kinfo!("{}", self.stats);
                    last_stats = Instant::now();
                }
            }
        }

        if let Err(e) = self.sink.flush() {
            kwarn!("sink flush: {}", e);
        }
        Ok(self.stats.clone())
    }

    /// One wait plus dispatch of every reported event.
    ///
    /// Returns the number of events handled (0 on timeout or EINTR).
    pub fn poll_once(&mut self, timeout: Option<Duration>) -> Result<usize> {
        let n = self.monitor.wait(&mut self.batch, timeout)?;
        for i in 0..n {
            if let Some(event) = self.batch.get(i) {
                self.dispatch(event);
            }
        }
        Ok(n)
    }

    fn dispatch(&mut self, event: Event) {
        ktrace!("{} {:?}", event.token, event.readiness);
        match event.token {
            Token::SHUTDOWN => self.on_shutdown(),
            Token::LISTENER => {
                self.accept_ready(event.readiness);
            }
            token => match token.index() {
                Some(idx) => {
                    self.drain_connection(idx, event.readiness);
                }
                None => kdebug!("event for unknown token {}", token),
            },
        }
    }

    fn on_shutdown(&mut self) {
        if let Err(e) = self.shutdown.drain() {
            kwarn!("{}", e);
        }
        kinfo!("shutdown requested, {} connection(s) open", self.conns.len());
        self.stopped = true;
    }

    /// Accept loop: accept until the listener would block.
    ///
    /// Returns the number of connections accepted by this invocation. Any
    /// accept error other than EAGAIN is logged and ends the loop; the
    /// listener stays registered.
    pub fn accept_ready(&mut self, readiness: Readiness) -> usize {
        if readiness.is_error() || readiness.is_hangup() {
            kwarn!("listener reported {:?}", readiness);
            if !readiness.is_readable() {
                return 0;
            }
        }

        self.stats.accept_batches += 1;
        let mut accepted = 0;
        loop {
            match self.listener.accept() {
                Ok(Some(conn)) => {
                    accepted += 1;
                    self.admit(conn);
                }
                Ok(None) => break,
                Err(e) => {
                    self.stats.errors += 1;
                    kerror!("{}", e);
                    break;
                }
            }
        }
        accepted
    }

    fn admit(&mut self, conn: ConnectionHandle) {
        self.stats.accepted += 1;
        let fd = conn.descriptor();
        match conn.peer_addr() {
            Some(peer) => self.record(&format!(
                "Accepted connection on descriptor {} (host={}, port={})",
                fd,
                peer.ip(),
                peer.port()
            )),
            None => self.record(&format!("Accepted connection on descriptor {}", fd)),
        }

        let idx = match self.conns.insert(conn) {
            Ok(idx) => idx,
            Err(conn) => {
                self.stats.rejected += 1;
                kwarn!(
                    "connection limit {} reached, dropping descriptor {}",
                    self.config.max_connections,
                    fd
                );
                self.close(conn, CloseReason::Rejected);
                return;
            }
        };

        let registered = match self.conns.get(idx) {
            Some(conn) => self.monitor.register(
                conn.as_fd(),
                Token::from_index(idx),
                Interest::READABLE | Interest::EDGE,
            ),
            None => return,
        };
        if let Err(e) = registered {
            self.stats.errors += 1;
            kerror!("register descriptor {}: {}", fd, e);
            self.finish(idx, CloseReason::RegisterFailed);
        }
    }

    /// Drain loop for the connection in slot `idx`.
    ///
    /// Reads until EAGAIN, forwarding every chunk to the sink in order.
    /// Returns `None` when the slot is empty (stale token).
    pub fn drain_connection(&mut self, idx: usize, readiness: Readiness) -> Option<ConnState> {
        let conn = self.conns.get(idx)?;

        if readiness.is_fault_only() {
            kwarn!("epoll error on descriptor {} ({:?})", conn.descriptor(), readiness);
            self.finish(idx, CloseReason::Fault);
            return Some(ConnState::Closed(CloseReason::Fault));
        }

        self.stats.drain_passes += 1;
        let mut buf = self.pool.acquire();

        let state = loop {
            match conn.read_into(&mut buf) {
                Ok(ReadOutcome::Data(n)) => {
                    if let Err(e) = self.sink.forward(&buf[..n]) {
                        self.stats.errors += 1;
                        kwarn!("descriptor {}: {}", conn.descriptor(), EdgeError::sink_write(&e));
                        break ConnState::Closed(CloseReason::SinkFailed);
                    }
                    self.stats.bytes_forwarded += n as u64;
                }
                Ok(ReadOutcome::WouldBlock) => break ConnState::Open,
                Ok(ReadOutcome::Eof) => break ConnState::Closed(CloseReason::Eof),
                Err(e) => {
                    self.stats.errors += 1;
                    kwarn!("descriptor {}: {}", conn.descriptor(), e);
                    break ConnState::Closed(CloseReason::ReadError);
                }
            }
        };

        self.pool.release(buf);

        if let ConnState::Closed(reason) = state {
            self.finish(idx, reason);
        }
        Some(state)
    }

    /// Remove slot `idx` from the slab and close it.
    fn finish(&mut self, idx: usize, reason: CloseReason) {
        if let Some(conn) = self.conns.remove(idx) {
            self.close(conn, reason);
        }
    }

    /// The single path that closes a connection (and with it, its
    /// readiness registration).
    fn close(&mut self, conn: ConnectionHandle, reason: CloseReason) {
        let fd = conn.close();
        self.stats.closed += 1;
        kdebug!("descriptor {} closed: {:?}", fd, reason);
        self.record(&format!("Closed connection on descriptor {}", fd));
    }

    fn record(&mut self, line: &str) {
        if let Err(e) = self.sink.record(line) {
            kwarn!("{}", EdgeError::sink_write(&e));
        }
    }
}
