//! # Device Record Model
//!
//! The aggregate produced for every target that accepted the audited
//! credential, together with the pieces the inventory extractor fills in.

use std::fmt;

use serde_json::{Value, json};

use crate::network::target::Target;

/// Username and password pair tried against every target of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of log lines.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Identity block read from the device. Each field is absent when the
/// device omitted the element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
}

/// Where a channel was reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSource {
    /// An input wired straight into the device.
    Direct,
    /// An input bridged through an IP/analog proxy.
    Proxy,
}

impl ChannelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelSource::Direct => "direct",
            ChannelSource::Proxy => "proxy",
        }
    }
}

/// Resolution reported for proxy channels, which carry no resolution metadata.
pub const PROXY_RESOLUTION: &str = "Proxy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoChannel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub resolution: Option<String>,
    pub source: ChannelSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: Option<String>,
    pub username: Option<String>,
    /// Vendor privilege label, kept verbatim.
    pub level: Option<String>,
}

/// Everything known about one device that accepted the credential.
///
/// Only the probe pipeline builds these, and only after the credential
/// check against this exact target succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub target: Target,
    pub credential: Credential,
    pub device_info: Option<DeviceInfo>,
    /// Direct channels first, then proxy channels, each in device order.
    pub channels: Vec<VideoChannel>,
    pub users: Vec<UserAccount>,
}

impl DeviceRecord {
    pub fn new(target: Target, credential: Credential) -> Self {
        Self {
            target,
            credential,
            device_info: None,
            channels: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn key(&self) -> String {
        self.target.key()
    }

    /// Structured form written to the catalog and printed to the console.
    ///
    /// `serde_json::Map` keeps keys sorted, so the rendering is stable.
    pub fn to_document(&self) -> Value {
        let info = match &self.device_info {
            Some(info) => json!({
                "name": info.name,
                "model": info.model,
                "firmware": info.firmware,
            }),
            None => json!({}),
        };

        let cameras: Vec<Value> = self
            .channels
            .iter()
            .map(|ch| {
                json!({
                    "id": ch.id,
                    "name": ch.name,
                    "resolution": ch.resolution,
                    "source": ch.source.as_str(),
                })
            })
            .collect();

        let users: Vec<Value> = self
            .users
            .iter()
            .map(|u| {
                json!({
                    "id": u.id,
                    "username": u.username,
                    "level": u.level,
                })
            })
            .collect();

        json!({
            "address": {
                "ip": self.target.address(),
                "port": self.target.port(),
                "link": self.target.link(),
            },
            "credentials": {
                "username": self.credential.username,
                "password": self.credential.password,
            },
            "info": info,
            "cameras": cameras,
            "users": users,
        })
    }

    /// Indented, key-sorted rendering of [`DeviceRecord::to_document`].
    pub fn to_pretty_json(&self) -> String {
        // Serializing a `Value` cannot fail.
        serde_json::to_string_pretty(&self.to_document()).unwrap_or_default()
    }
}
