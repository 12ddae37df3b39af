use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV: &str = "PAGEHTTPD_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to (e.g., "0.0.0.0:8080")
    pub listen_addr: String,

    /// 1 serves connections strictly one after another.
    pub max_concurrent_connections: usize,

    /// Per-read timeout for client sockets. None blocks forever.
    pub read_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory holding `<name>.html` pages and `404.html`
    pub html_root: PathBuf,

    /// Directory served under `/static/`
    pub static_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            max_concurrent_connections: 1,
            read_timeout_ms: None,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            html_root: PathBuf::from("www"),
            static_root: PathBuf::from("static"),
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Config {
    /// Loads configuration and pins the listener to `port`.
    ///
    /// The YAML file named by `PAGEHTTPD_CONFIG` is used when the variable is
    /// set; otherwise every field keeps its default.
    pub fn load(port: u16) -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.set_port(port);
        Ok(cfg)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Invalid config file {}", path))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw)?;
        if cfg.server.max_concurrent_connections == 0 {
            anyhow::bail!("server.max_concurrent_connections must be at least 1");
        }
        Ok(cfg)
    }

    /// Replaces the port part of `listen_addr`, keeping the host.
    ///
    /// Accepts `ip:port`, `[v6]:port`, a bare IP (including `::1`), or
    /// `hostname[:port]`.
    pub fn set_port(&mut self, port: u16) {
        let addr = self.server.listen_addr.as_str();
        self.server.listen_addr = if let Ok(mut sock) = addr.parse::<SocketAddr>() {
            sock.set_port(port);
            sock.to_string()
        } else if let Ok(ip) = addr.parse::<IpAddr>() {
            SocketAddr::new(ip, port).to_string()
        } else {
            let host = addr.rsplit_once(':').map_or(addr, |(host, _)| host);
            format!("{}:{}", host, port)
        };
    }
}
