//! Runtime settings
//!
//! Built by the CLI and passed explicitly into the daemon; nothing in the
//! library reads process-wide state.

use crate::dispatch::DEFAULT_COMPOSE_BIN;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default compose file path
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 80;

/// How dispatch outcomes map to HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// 200 success, 404 unknown service, 502 command failure
    #[default]
    Strict,
    /// 200 success, 200 unknown service, 500 command failure
    Legacy,
}

/// compose-middleware settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Compose file, or a directory containing one
    pub compose_file: PathBuf,
    /// Address to listen on
    pub bind: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// docker-compose binary
    pub compose_bin: String,
    /// Working directory for docker-compose invocations
    pub workdir: PathBuf,
    pub status_policy: StatusPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compose_file: PathBuf::from(DEFAULT_COMPOSE_FILE),
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            compose_bin: DEFAULT_COMPOSE_BIN.to_string(),
            workdir: PathBuf::from("./"),
            status_policy: StatusPolicy::default(),
        }
    }
}

impl Settings {
    /// Socket address the daemon binds
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
