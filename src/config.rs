//! Configuration management for the MCP tool server
//!
//! Handles the listen address, the tool working directory and the server
//! identity advertised to clients.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ConfigError, McpToolServerError, Result};
use crate::mcp::types::ServerInfo;

/// Default listen host (local-only tool)
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for the MCP tool server
#[derive(Debug, Clone)]
pub struct Config {
    /// Host or IP address to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Directory the filesystem tools operate in
    pub workdir: PathBuf,

    /// Advertised server name
    pub server_name: String,

    /// Advertised server version
    pub server_version: String,
}

impl Config {
    /// Create a new configuration from environment variables and defaults
    pub fn new() -> Result<Self> {
        let host = std::env::var("MCP_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match std::env::var("MCP_PORT") {
            Ok(value) => value.parse().map_err(|_| {
                McpToolServerError::Config(ConfigError::InvalidEnvVar {
                    var: "MCP_PORT".to_string(),
                    value,
                })
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let workdir = match std::env::var("MCP_WORKDIR") {
            Ok(path) => PathBuf::from(path),
            Err(_) => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        };

        let config = Self {
            host,
            port,
            workdir,
            server_name: SERVER_NAME.to_string(),
            server_version: SERVER_VERSION.to_string(),
        };
        config.validate()?;

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        workdir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(workdir) = workdir {
            self.workdir = workdir;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the working directory is usable
    fn validate(&self) -> Result<()> {
        if !self.workdir.is_dir() {
            return Err(ConfigError::InvalidWorkdir {
                path: self.workdir.display().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Socket address to bind
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress { address }.into())
    }

    /// Server identity, identical in the SSE announcement and `initialize`
    pub fn identity(&self) -> ServerInfo {
        ServerInfo {
            name: self.server_name.clone(),
            version: self.server_version.clone(),
        }
    }
}

/// Advertised server name
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

/// Advertised server version
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoint constants
pub mod endpoint {
    /// The single combined SSE + JSON-RPC route
    pub const PATH: &str = "/mcp";

    /// Maximum accepted POST body (2 MiB)
    pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

    /// Client reconnect hint sent at the top of the event stream
    pub const SSE_RETRY_MS: u64 = 2000;
}
