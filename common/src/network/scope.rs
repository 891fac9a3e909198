//! # Authorized Scope
//!
//! The set of networks an operator is allowed to audit. Every candidate coming
//! out of discovery is checked against it before a single request is sent.

use std::fmt;
use std::net::IpAddr;

use pnet::ipnetwork::IpNetwork;
use thiserror::Error;

use crate::network::target::Target;

/// Narrowest prefix accepted for an IPv4 scope entry.
pub const MIN_IPV4_PREFIX: u8 = 16;
/// Narrowest prefix accepted for an IPv6 scope entry.
pub const MIN_IPV6_PREFIX: u8 = 48;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("invalid network '{entry}': {reason}")]
    Invalid { entry: String, reason: String },
    #[error("network '{entry}' is too broad, prefix must be at least /{min}")]
    TooBroad { entry: String, min: u8 },
    #[error("at least one scope network is required")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    networks: Vec<IpNetwork>,
}

impl Scope {
    /// Parses CIDR entries (`203.0.113.0/24`, `2001:db8::/48`, or a bare address).
    pub fn parse<I, S>(entries: I) -> Result<Self, ScopeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut networks = Vec::new();

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            networks.push(parse_network(entry)?);
        }

        if networks.is_empty() {
            return Err(ScopeError::Empty);
        }

        Ok(Self { networks })
    }

    pub fn networks(&self) -> &[IpNetwork] {
        &self.networks
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(ip))
    }

    /// Hostnames are never in scope: only IP literals can be matched against networks.
    pub fn permits(&self, target: &Target) -> bool {
        target.ip().is_some_and(|ip| self.contains(ip))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.networks.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", joined.join(","))
    }
}

fn parse_network(entry: &str) -> Result<IpNetwork, ScopeError> {
    let network: IpNetwork = entry.parse().map_err(|e| ScopeError::Invalid {
        entry: entry.to_string(),
        reason: format!("{e}"),
    })?;

    let min = match network {
        IpNetwork::V4(_) => MIN_IPV4_PREFIX,
        IpNetwork::V6(_) => MIN_IPV6_PREFIX,
    };

    if network.prefix() < min {
        return Err(ScopeError::TooBroad {
            entry: entry.to_string(),
            min,
        });
    }

    Ok(network)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
