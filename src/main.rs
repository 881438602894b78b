use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser};

mod error;
mod logging;
mod probe;
mod resolve;
mod wait;
mod wol;

use error::{Error, EXIT_TIMED_OUT, EXIT_USAGE};
use probe::TcpProber;
use wait::{MonotonicClock, Outcome, UdpWaker, WaitPolicy};
use wol::{HardwareAddress, MagicPacket};

/// Send Wake-on-LAN packets until a host accepts TCP connections on a port.
///
/// Exits 0 once the host is up, 2 on timeout, 1 on bad usage, 3 when a name
/// cannot be resolved, 4 on socket errors and 5 when the wake packet can't be
/// sent.
#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Args {
    /// MAC address to wake, e.g. aa:bb:cc:dd:ee:ff.
    mac: HardwareAddress,

    /// Hostname or IP address to probe.
    host: String,

    /// TCP port to probe.
    port: String,

    /// Give up after this many seconds.
    #[arg(short = 'w', long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Wait forever.
    #[arg(short, long, conflicts_with = "timeout")]
    forever: bool,

    /// Seconds to wait between attempts.
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    delay: u64,

    /// Address to send wake packets to.
    #[arg(short = 'A', long, default_value = "255.255.255.255")]
    address: String,

    /// UDP port to send wake packets to.
    #[arg(short = 'P', long, default_value_t = 9, value_parser = clap::value_parser!(u16).range(1..))]
    wake_port: u16,

    /// Send wake packets to the host itself instead of broadcasting.
    #[arg(short = 'D', long, conflicts_with = "address")]
    direct: bool,

    /// Seconds to allow each connection attempt.
    #[arg(short, long, default_value_t = probe::DEFAULT_CONNECT_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    connect_timeout: u64,

    /// Log more (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            timeout: (!self.forever).then(|| Duration::from_secs(self.timeout)),
            retry_delay: Duration::from_secs(self.delay),
        }
    }
}

fn wake_and_wait(args: &Args) -> Result<Outcome, Error> {
    // Both resolutions happen before any socket is opened.
    let target = resolve::resolve(&args.host, &args.port)?.swap_remove(0);
    let wake_host = if args.direct {
        &args.host
    } else {
        &args.address
    };
    let wake = resolve::resolve_first(wake_host, args.wake_port)?;

    tracing::info!(mac = %args.mac, %wake, %target, "waking");

    let packet = MagicPacket::new(args.mac);
    let mut waker = UdpWaker::new(wake)?;
    let mut prober = TcpProber::new(target, Duration::from_secs(args.connect_timeout));

    Ok(wait::run(
        &packet,
        &mut waker,
        &mut prober,
        &args.policy(),
        &mut MonotonicClock,
    )?)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init(args.verbose);

    match wake_and_wait(&args) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::TimedOut) => {
            eprintln!("wolwait: timed out waiting for {} port {}", args.host, args.port);
            ExitCode::from(EXIT_TIMED_OUT)
        }
        Err(err) => {
            eprintln!("wolwait: {err}");
            ExitCode::from(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("wolwait").chain(argv.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["AA:BB:CC:DD:EE:FF", "192.0.2.10", "22"]).unwrap();
        assert_eq!(args.address, "255.255.255.255");
        assert_eq!(args.wake_port, 9);
        assert_eq!(
            args.policy(),
            WaitPolicy {
                timeout: Some(Duration::from_secs(300)),
                retry_delay: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn test_forever() {
        let args = parse(&["-f", "-d", "2", "aa-bb-cc-dd-ee-ff", "host", "22"]).unwrap();
        assert_eq!(args.policy().timeout, None);
        assert_eq!(args.policy().retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_rejects_bad_usage() {
        for argv in [
            &["aa:bb:cc:dd:ee:ff", "host"][..],
            &["not-a-mac", "host", "22"],
            &["-w", "0", "aa:bb:cc:dd:ee:ff", "host", "22"],
            &["-d", "0", "aa:bb:cc:dd:ee:ff", "host", "22"],
            &["-P", "0", "aa:bb:cc:dd:ee:ff", "host", "22"],
            &["-f", "-w", "10", "aa:bb:cc:dd:ee:ff", "host", "22"],
            &["-D", "-A", "10.0.0.255", "aa:bb:cc:dd:ee:ff", "host", "22"],
        ] {
            assert!(parse(argv).is_err(), "{argv:?}");
        }
    }

    #[test]
    fn test_bad_target_port_is_usage_error() {
        let args = parse(&["aa:bb:cc:dd:ee:ff", "127.0.0.1", "0"]).unwrap();
        let err = wake_and_wait(&args).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }
}
