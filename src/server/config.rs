//! HTTP server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::config::ConfigError;

/// Configuration for the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable CORS for API
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Run the periodic tick loop alongside the API
    pub enable_tick_loop: bool,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            enable_cors: true,
            enable_request_logging: true,
            enable_tick_loop: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    bind_address: Option<SocketAddr>,
    enable_cors: Option<bool>,
    enable_request_logging: Option<bool>,
    enable_tick_loop: Option<bool>,
}

impl ServerConfigBuilder {
    /// Set bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = Some(addr);
        self
    }

    /// Set bind address from string
    pub fn bind_address_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_address = Some(parse_bind_address(addr)?);
        Ok(self)
    }

    /// Enable/disable CORS
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = Some(enable);
        self
    }

    /// Enable/disable request logging
    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    /// Enable/disable the periodic tick loop
    pub fn enable_tick_loop(mut self, enable: bool) -> Self {
        self.enable_tick_loop = Some(enable);
        self
    }

    /// Build the config
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            bind_address: self.bind_address.unwrap_or_else(default_bind_address),
            enable_cors: self.enable_cors.unwrap_or(true),
            enable_request_logging: self.enable_request_logging.unwrap_or(true),
            enable_tick_loop: self.enable_tick_loop.unwrap_or(true),
        }
    }
}

/// Parse a `host:port` bind address
pub fn parse_bind_address(addr: &str) -> Result<SocketAddr, ConfigError> {
    addr.parse().map_err(|_| ConfigError::InvalidValue {
        field: "bind_address".to_string(),
        reason: format!("Invalid address: {}", addr),
    })
}
