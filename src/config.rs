use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default relay port
pub const DEFAULT_PORT: u16 = 8765;

/// Default per-connection outbound queue depth
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Path of the WebSocket endpoint
pub const WS_PATH: &str = "/ws";

/// Relay server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Word list file, one word per line. The built-in pool is used when unset.
    pub words_file: Option<PathBuf>,
    /// Where finished drawings are archived
    pub snapshot_dir: Option<PathBuf>,
    pub outbound_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
            words_file: None,
            snapshot_dir: None,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Zero would make every send fail, so clamp to one
    pub fn outbound_capacity(&self) -> usize {
        self.outbound_capacity.max(1)
    }
}
