#![allow(dead_code)]

use edge_core::monitor::ReadinessMonitor;
use edge_core::sink::ByteSink;
use edge_server::{EdgeServer, MemorySink, ServerConfig};

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

pub fn loopback(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
    };
    SocketAddr::new(ip, addr.port())
}

/// Server on an ephemeral port, capturing into a shared `MemorySink`.
pub fn server(config: ServerConfig) -> (EdgeServer<MemorySink>, MemorySink) {
    let sink = MemorySink::new();
    let server = EdgeServer::bind_with_sink(0u16, config, sink.clone()).expect("bind");
    (server, sink)
}

pub fn connect<S: ByteSink, M: ReadinessMonitor>(server: &EdgeServer<S, M>) -> TcpStream {
    TcpStream::connect(loopback(server.local_addr())).expect("connect")
}

/// Drive the loop until `done` holds or five seconds pass.
pub fn pump_until<S: ByteSink, M: ReadinessMonitor>(
    server: &mut EdgeServer<S, M>,
    mut done: impl FnMut(&EdgeServer<S, M>) -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done(server) {
            return true;
        }
        server
            .poll_once(Some(Duration::from_millis(20)))
            .expect("poll_once");
    }
    done(server)
}

/// Descriptor number from an "Accepted ..." or "Closed ..." line.
pub fn descriptor_of(line: &str) -> Option<i32> {
    line.split_whitespace().nth(4)?.parse().ok()
}

pub fn settle() {
    std::thread::sleep(Duration::from_millis(50));
}
