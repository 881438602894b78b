//! Failure taxonomy and the exit status each one maps to.
use std::io;
use std::process::ExitCode;

use thiserror::Error;

use crate::resolve::ResolveError;

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_TIMED_OUT: u8 = 2;
pub const EXIT_RESOLUTION: u8 = 3;
pub const EXIT_SOCKET: u8 = 4;
pub const EXIT_SEND: u8 = 5;

/// Hard failure of the local wake transport. Ends the wait loop at once.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("could not create UDP socket: {0}")]
    Socket(#[source] io::Error),

    #[error("could not enable broadcast on UDP socket: {0}")]
    Broadcast(#[source] io::Error),

    #[error("could not send wake packet: {0}")]
    Send(#[source] io::Error),

    #[error("short send of wake packet: {written} of {expected} bytes")]
    ShortSend { written: usize, expected: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl TransportError {
    pub fn exit_code(&self) -> u8 {
        match self {
            TransportError::Socket(_) | TransportError::Broadcast(_) => EXIT_SOCKET,
            TransportError::Send(_) | TransportError::ShortSend { .. } => EXIT_SEND,
        }
    }
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Resolve(ResolveError::InvalidPort(_)) => EXIT_USAGE,
            Error::Resolve(_) => EXIT_RESOLUTION,
            Error::Transport(err) => err.exit_code(),
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        ExitCode::from(err.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let denied = || io::Error::from(io::ErrorKind::PermissionDenied);
        let cases = [
            (
                Error::Resolve(ResolveError::InvalidPort("0".into())),
                EXIT_USAGE,
            ),
            (
                Error::Resolve(ResolveError::NoAddress("example".into())),
                EXIT_RESOLUTION,
            ),
            (TransportError::Socket(denied()).into(), EXIT_SOCKET),
            (TransportError::Broadcast(denied()).into(), EXIT_SOCKET),
            (TransportError::Send(denied()).into(), EXIT_SEND),
            (
                TransportError::ShortSend {
                    written: 10,
                    expected: 102,
                }
                .into(),
                EXIT_SEND,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }
}
