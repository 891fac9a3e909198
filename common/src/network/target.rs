//! # Probe Target Model
//!
//! A target is one `address:port` pair handed out by the discovery provider
//! (or typed by the operator for a single check).
//!
//! Supported input formats:
//! * `192.168.1.5:80`
//! * `[2001:db8::1]:8443`
//! * `camera.example.net:443`

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("missing port in '{0}', expected address:port")]
    MissingPort(String),
    #[error("invalid port '{port}' in '{input}'")]
    InvalidPort { input: String, port: String },
    #[error("empty address in '{0}'")]
    EmptyAddress(String),
}

/// A single device endpoint. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    address: String,
    port: u16,
}

impl Target {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Identity used for duplicate suppression: `address:port`, compared verbatim.
    pub fn key(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// The address as an IP literal, if it is one.
    pub fn ip(&self) -> Option<IpAddr> {
        self.address.parse().ok()
    }

    /// Devices on 443/8443 serve their web UI over TLS, everything else is plain HTTP.
    pub fn scheme(&self) -> &'static str {
        match self.port {
            443 | 8443 => "https",
            _ => "http",
        }
    }

    pub fn base_url(&self) -> String {
        match self.ip() {
            Some(IpAddr::V6(v6)) => format!("{}://[{}]:{}", self.scheme(), v6, self.port),
            _ => format!("{}://{}:{}", self.scheme(), self.address, self.port),
        }
    }

    /// Absolute URL for an API path on this device. `path` must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Link stored alongside a catalog entry.
    pub fn link(&self) -> String {
        self.url("/")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl FromStr for Target {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Bracketed IPv6: "[::1]:80"
        if let Some(rest) = s.strip_prefix('[') {
            let Some((addr, port)) = rest.split_once("]:") else {
                return Err(TargetParseError::MissingPort(s.to_string()));
            };
            return build(s, addr, port);
        }

        let Some((addr, port)) = s.rsplit_once(':') else {
            return Err(TargetParseError::MissingPort(s.to_string()));
        };

        build(s, addr, port)
    }
}

fn build(input: &str, addr: &str, port: &str) -> Result<Target, TargetParseError> {
    if addr.is_empty() {
        return Err(TargetParseError::EmptyAddress(input.to_string()));
    }

    let port: u16 = port.parse().map_err(|_| TargetParseError::InvalidPort {
        input: input.to_string(),
        port: port.to_string(),
    })?;

    Ok(Target::new(addr, port))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
