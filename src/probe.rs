//! Liveness probing over TCP.
use std::net::TcpStream;
use std::time::Duration;

use crate::resolve::Endpoint;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Reachable,
    Unreachable,
}

pub trait Prober {
    fn probe(&mut self) -> Liveness;
}

/// Probes by completing a TCP handshake with the target service. A fresh
/// socket is used per attempt and dropped straight away, whatever the result.
pub struct TcpProber {
    target: Endpoint,
    connect_timeout: Duration,
}

impl TcpProber {
    pub fn new(target: Endpoint, connect_timeout: Duration) -> Self {
        Self {
            target,
            connect_timeout,
        }
    }
}

impl Prober for TcpProber {
    fn probe(&mut self) -> Liveness {
        match TcpStream::connect_timeout(&self.target.addr(), self.connect_timeout) {
            Ok(_stream) => Liveness::Reachable,
            Err(err) => {
                tracing::debug!(endpoint = %self.target, kind = ?err.kind(), "probe failed: {err}");
                Liveness::Unreachable
            }
        }
    }
}
