//! Turns host/port strings into socket addresses for the wake and probe sides.
use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid port '{0}': expected an integer between 1 and 65535")]
    InvalidPort(String),

    #[error("unable to resolve host '{host}': {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to resolve host '{0}': no addresses found")]
    NoAddress(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

/// One resolved candidate. The family travels with the address so the socket
/// created for it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    addr: SocketAddr,
}

impl Endpoint {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn family(&self) -> Family {
        match self.addr {
            SocketAddr::V4(_) => Family::V4,
            SocketAddr::V6(_) => Family::V6,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.addr.fmt(f)
    }
}

/// Parses a service port. Zero is rejected along with anything that isn't a
/// plain decimal integer in range.
pub fn parse_port(port: &str) -> Result<u16, ResolveError> {
    let invalid = || ResolveError::InvalidPort(port.to_string());
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(port) => Ok(port),
    }
}

/// Resolves a name or numeric address into every candidate endpoint, in the
/// order the system resolver returned them.
pub fn resolve(host: &str, port: &str) -> Result<Vec<Endpoint>, ResolveError> {
    let port = parse_port(port)?;
    resolve_port(host, port)
}

pub fn resolve_port(host: &str, port: u16) -> Result<Vec<Endpoint>, ResolveError> {
    // Accept bracketed IPv6 literals as written in URLs.
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    let endpoints: Vec<Endpoint> = (bare, port)
        .to_socket_addrs()
        .map_err(|source| ResolveError::Lookup {
            host: host.to_string(),
            source,
        })?
        .map(Endpoint::new)
        .collect();

    if endpoints.is_empty() {
        return Err(ResolveError::NoAddress(host.to_string()));
    }

    tracing::debug!(host, candidates = endpoints.len(), "resolved");
    Ok(endpoints)
}

/// Only the first candidate is ever used; no fallback across records.
pub fn resolve_first(host: &str, port: u16) -> Result<Endpoint, ResolveError> {
    let mut endpoints = resolve_port(host, port)?;
    Ok(endpoints.swap_remove(0))
}
