mod common;

use common::{connect, pump_until, server, settle};
use edge_server::ServerConfig;

use std::io::Write;
use std::thread;
use std::time::Duration;

#[test]
fn hello_is_forwarded_and_accept_logged() {
    let (mut server, sink) = server(ServerConfig::new());
    let mut client = connect(&server);
    client.write_all(b"hello").unwrap();

    assert!(pump_until(&mut server, |_| sink.byte_len() >= 5));
    assert_eq!(sink.bytes(), b"hello");

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let accepted = &lines[0];
    assert!(accepted.starts_with("Accepted connection on descriptor "), "{}", accepted);

    let local = client.local_addr().unwrap();
    assert!(accepted.contains(&format!("port={})", local.port())), "{}", accepted);
    assert!(accepted.contains("127.0.0.1") || accepted.contains("::1"), "{}", accepted);
}

#[test]
fn two_bursts_drained_on_one_notification() {
    // 4-byte reads: the drain must loop to EAGAIN to see both bursts.
    let (mut server, sink) = server(ServerConfig::new().read_buffer_size(4));
    let mut client = connect(&server);
    assert!(pump_until(&mut server, |s| s.connection_count() == 1));
    assert_eq!(server.stats().drain_passes, 0);

    client.write_all(b"first-burst;").unwrap();
    client.write_all(b"second-burst").unwrap();
    settle();

    let n = server.poll_once(Some(Duration::from_secs(2))).unwrap();
    assert_eq!(n, 1);
    assert_eq!(server.stats().drain_passes, 1);
    assert_eq!(sink.bytes(), b"first-burst;second-burst");
    assert_eq!(server.connection_count(), 1);

    // Nothing left behind, so no further edge.
    assert_eq!(server.poll_once(Some(Duration::from_millis(50))).unwrap(), 0);
}

#[test]
fn small_read_buffer_still_drains_everything() {
    let (mut server, sink) = server(ServerConfig::new().read_buffer_size(7).buffer_pool_size(1));
    let payload: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();

    let mut client = connect(&server);
    client.write_all(&payload).unwrap();

    assert!(pump_until(&mut server, |_| sink.byte_len() == payload.len()));
    assert_eq!(sink.bytes(), payload);
    assert_eq!(server.stats().bytes_forwarded, payload.len() as u64);
}

#[test]
fn concurrent_clients_keep_their_own_byte_order() {
    const CLIENTS: usize = 8;
    const LEN: usize = 4096;

    let (mut server, sink) = server(ServerConfig::new());
    let addr = common::loopback(server.local_addr());

    // Client i only uses bytes i*16 .. i*16+15, so its stream can be
    // pulled back out of the merged output.
    let payload = |i: usize| -> Vec<u8> { (0..LEN).map(|j| (i * 16 + j % 16) as u8).collect() };

    let writers: Vec<_> = (0..CLIENTS)
        .map(|i| {
            let bytes = payload(i);
            thread::spawn(move || {
                let mut s = std::net::TcpStream::connect(addr).unwrap();
                s.write_all(&bytes).unwrap();
                s
            })
        })
        .collect();

    assert!(pump_until(&mut server, |_| sink.byte_len() == CLIENTS * LEN));
    let _streams: Vec<_> = writers.into_iter().map(|w| w.join().unwrap()).collect();

    let all = sink.bytes();
    for i in 0..CLIENTS {
        let mine: Vec<u8> = all.iter().copied().filter(|b| *b as usize / 16 == i).collect();
        assert_eq!(mine, payload(i), "client {} stream reordered", i);
    }
    assert_eq!(server.stats().accepted, CLIENTS as u64);
}
