//! The wake-and-wait loop: send a magic packet, probe, sleep, repeat.
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::TransportError;
use crate::probe::{Liveness, Prober};
use crate::resolve::{Endpoint, Family};
use crate::wol::MagicPacket;

/// How long to keep trying and how long to pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// `None` waits until the target answers.
    pub timeout: Option<Duration>,
    /// Always non-zero.
    pub retry_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TimedOut,
}

pub trait WakeSender {
    fn send(&mut self, packet: &MagicPacket) -> Result<(), TransportError>;
}

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&mut self, duration: Duration);
}

pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// UDP socket bound to the wake endpoint's family. Broadcast is switched on
/// for IPv4 so both limited and subnet-directed broadcasts go out.
pub struct UdpWaker {
    socket: UdpSocket,
    destination: Endpoint,
}

impl UdpWaker {
    pub fn new(destination: Endpoint) -> Result<Self, TransportError> {
        let local = match destination.family() {
            Family::V4 => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            Family::V6 => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };

        let socket = UdpSocket::bind(local).map_err(TransportError::Socket)?;
        if destination.family() == Family::V4 {
            socket.set_broadcast(true).map_err(TransportError::Broadcast)?;
        }

        Ok(Self {
            socket,
            destination,
        })
    }
}

impl WakeSender for UdpWaker {
    fn send(&mut self, packet: &MagicPacket) -> Result<(), TransportError> {
        let bytes = packet.as_bytes();
        match self.socket.send_to(bytes, self.destination.addr()) {
            Ok(written) if written == bytes.len() => Ok(()),
            Ok(written) => Err(TransportError::ShortSend {
                written,
                expected: bytes.len(),
            }),
            // ICMP from an earlier datagram; nobody listening is not an error here.
            Err(err) if err.kind() == io::ErrorKind::ConnectionRefused => {
                tracing::debug!(destination = %self.destination, "wake packet refused");
                Ok(())
            }
            Err(err) => Err(TransportError::Send(err)),
        }
    }
}

/// Runs until the target answers or the deadline passes. A wake transport
/// failure ends the loop at once; nothing is sent or probed after that.
pub fn run<W, P, C>(
    packet: &MagicPacket,
    waker: &mut W,
    prober: &mut P,
    policy: &WaitPolicy,
    clock: &mut C,
) -> Result<Outcome, TransportError>
where
    W: WakeSender,
    P: Prober,
    C: Clock,
{
    let start = clock.now();
    // A deadline past what Instant can hold is as good as none.
    let deadline = policy.timeout.and_then(|timeout| start.checked_add(timeout));
    if policy.timeout.is_some() && deadline.is_none() {
        tracing::debug!(timeout = ?policy.timeout, "timeout out of range, waiting without a deadline");
    }
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        tracing::debug!(attempt, "sending wake packet");
        waker.send(packet)?;

        if prober.probe() == Liveness::Reachable {
            tracing::info!(attempt, elapsed = ?clock.now() - start, "target reachable");
            return Ok(Outcome::Success);
        }

        if deadline.is_some_and(|deadline| clock.now() >= deadline) {
            tracing::info!(attempt, elapsed = ?clock.now() - start, "gave up waiting");
            return Ok(Outcome::TimedOut);
        }

        clock.sleep(policy.retry_delay);
    }
}
