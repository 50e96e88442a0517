//! # Identity
//!
//! The overlay has no certificate authority and no handshake — a peer's
//! identity is whatever string its operator chose at startup. [`PeerId`]
//! wraps that convention so the rest of the crate doesn't pass around bare
//! `String`s for two semantically different things (a peer's identity vs.
//! a file name, say).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a peer, chosen by its operator at startup.
///
/// Uniqueness is a convention, not a cryptographic guarantee — nothing in
/// this protocol authenticates that a peer is who it claims to be.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A `(host, port)` pair identifying where a peer's P2P server accepts
/// connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Renders `host:port`, suitable for `ToSocketAddrs` resolution.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
