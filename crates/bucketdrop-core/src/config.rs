use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use thiserror::Error;

pub const REGION_VAR: &str = "AWS_REGION";
pub const BUCKET_VAR: &str = "S3_BUCKET";
pub const KEY_PREFIX_VAR: &str = "S3_KEY_PATH";
pub const PORT_VAR: &str = "PORT";

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_BUCKET: &str = "my-bucket";
const DEFAULT_KEY_PREFIX: &str = "uploads/";
const DEFAULT_PORT: &str = "8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port {0:?}: expected a number between 0 and 65535")]
    InvalidPort(String),
}

/// Process-wide settings, resolved once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Object-store region.
    pub region: String,
    /// Bucket every upload lands in.
    pub bucket: String,
    /// Prepended to every uploaded filename to form the object key.
    pub key_prefix: String,
    /// Listen port, kept as text until the listener is bound.
    pub port: String,
}

impl Settings {
    /// Resolve every setting through `lookup`, falling back to the built-in
    /// default when the variable is unset or empty.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str, default: &str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            region: get(REGION_VAR, DEFAULT_REGION),
            bucket: get(BUCKET_VAR, DEFAULT_BUCKET),
            key_prefix: get(KEY_PREFIX_VAR, DEFAULT_KEY_PREFIX),
            port: get(PORT_VAR, DEFAULT_PORT),
        }
    }

    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(|var| std::env::var(var).ok())
    }

    /// Object key for an uploaded file. The filename is used verbatim.
    pub fn object_key(&self, filename: &str) -> String {
        format!("{}{}", self.key_prefix, filename)
    }

    fn port_number(&self) -> Result<u16, ConfigError> {
        self.port
            .parse()
            .map_err(|_| ConfigError::InvalidPort(self.port.clone()))
    }

    /// Address to bind: the configured port on every IPv6 and IPv4
    /// interface (dual-stack).
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::from((Ipv6Addr::UNSPECIFIED, self.port_number()?)))
    }

    /// IPv4-only fallback for hosts without IPv6.
    pub fn listen_addr_v4(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port_number()?)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(|_| None)
    }
}
