mod common;

use common::{connect, descriptor_of, pump_until, server, settle};
use edge_core::event::Readiness;
use edge_server::ServerConfig;

use std::io::Read;
use std::time::Duration;

#[test]
fn backlog_drained_in_one_accept_pass() {
    const K: usize = 8;
    let (mut server, sink) = server(ServerConfig::new());

    let _clients: Vec<_> = (0..K).map(|_| connect(&server)).collect();
    settle();

    let n = server.poll_once(Some(Duration::from_secs(2))).unwrap();
    assert_eq!(n, 1);
    assert_eq!(server.stats().accept_batches, 1);
    assert_eq!(server.stats().accepted, K as u64);
    assert_eq!(server.connection_count(), K);
    assert_eq!(sink.lines().len(), K);
}

#[test]
fn accept_with_nothing_pending_returns_zero() {
    let (mut server, _sink) = server(ServerConfig::new());
    assert_eq!(server.accept_ready(Readiness::READABLE), 0);
    assert_eq!(server.stats().accept_batches, 1);
    assert_eq!(server.stats().errors, 0);
}

#[test]
fn listener_fault_without_data_is_ignored() {
    let (mut server, _sink) = server(ServerConfig::new());
    assert_eq!(server.accept_ready(Readiness::ERROR), 0);
    assert_eq!(server.stats().accept_batches, 0);

    // Listener still works afterwards.
    let _client = connect(&server);
    assert!(pump_until(&mut server, |s| s.stats().accepted == 1));
}

#[test]
fn connection_cap_closes_overflow() {
    let (mut server, sink) = server(ServerConfig::new().max_connections(1));

    let _first = connect(&server);
    assert!(pump_until(&mut server, |s| s.connection_count() == 1));

    let mut second = connect(&server);
    assert!(pump_until(&mut server, |s| s.stats().rejected == 1));
    assert_eq!(server.connection_count(), 1);
    assert_eq!(server.stats().closed, 1);

    let lines = sink.lines();
    let closed = lines.last().unwrap();
    assert!(closed.starts_with("Closed connection on descriptor"), "{}", closed);

    second.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let mut buf = [0u8; 8];
    // Server side is gone: EOF or reset.
    match second.read(&mut buf) {
        Ok(0) | Err(_) => {}
        Ok(n) => panic!("unexpected {} bytes from rejected connection", n),
    }

    assert_eq!(descriptor_of(&lines[1]), descriptor_of(closed));
}

#[test]
fn stale_token_is_ignored() {
    let (mut server, _sink) = server(ServerConfig::new());
    assert_eq!(server.drain_connection(42, Readiness::READABLE), None);
}
