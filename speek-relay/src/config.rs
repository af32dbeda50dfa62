use clap::Parser;
use std::net::SocketAddr;

/// Command line / environment configuration of the relay server.
#[derive(Debug, Clone, Parser)]
#[command(name = "speek-relay", about = "Room relay for speek meeting signaling")]
pub struct RelayConfig {
    /// Address the WebSocket endpoint listens on.
    #[arg(long, env = "SPEEK_BIND", default_value = "0.0.0.0:3333")]
    pub bind: SocketAddr,

    /// tracing filter directive, e.g. `info` or `speek_relay=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}
