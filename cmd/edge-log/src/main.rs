//! edge-log: TCP log server
//!
//! Listens on the given port (IPv4 or IPv6, whichever resolves first) and
//! copies every byte received from every client to stdout, along with
//! one line per accepted and closed connection.
//!
//! Usage:
//!     cargo build --release -p edge-log
//!     ./target/release/edge-log <port>
//!
//! Test with:
//!     echo "hello" | nc localhost 9000
//!
//! Tuning comes from EDGE_* environment variables (see ServerConfig).
//! SIGINT / SIGTERM stop the loop and print counters to stderr.

use edge_core::{kerror, kprint, kwarn};
use edge_server::{EdgeServer, ServerConfig};

use std::process::ExitCode;

const EXIT_STARTUP: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Exactly one positional argument: the port or service name.
fn parse_args(args: &[String]) -> Result<&str, String> {
    let prog = args.first().map(String::as_str).unwrap_or("edge-log");
    match args {
        [_, port] if !port.is_empty() => Ok(port.as_str()),
        _ => Err(format!("Usage: {} [port]", prog)),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let port = match parse_args(&args) {
        Ok(port) => port,
        Err(usage) => {
            eprintln!("{}", usage);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    kprint::init();
    kprint::set_tag("edge-log");

    let config = ServerConfig::from_env();
    let mut server = match EdgeServer::bind(port, config) {
        Ok(server) => server,
        Err(e) => {
            kerror!("{}", e);
            return ExitCode::from(EXIT_STARTUP);
        }
    };

    match server.shutdown_handle().install_signal_handlers() {
        Ok(true) => {}
        Ok(false) => kwarn!("signal handlers already installed"),
        Err(e) => {
            kerror!("{}", e);
            return ExitCode::from(EXIT_STARTUP);
        }
    }

    match server.run() {
        Ok(stats) => {
            eprintln!("edge-log: {}", stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            kerror!("{}", e);
            ExitCode::FAILURE
        }
    }
}
