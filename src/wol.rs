//! Parses an IEEE EUI-48 MAC address and continues to construct a
//! WakeOnLAN packet (so called "Magic Packet Technology")
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const MAGIC_PACKET_LEN: usize = 102;
const SYNC_STREAM: [u8; 6] = [0xFF; 6];

/// The six octets identifying the interface to wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareAddress([u8; 6]);

/// The 102 byte wake frame. Built once per run and resent on every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MacParseError {
    /// Input ended early or held a non-hex character where an octet was due
    #[error("expected a hex digit at position {0}")]
    ExpectedHexDigit(usize),

    /// Something left over after the sixth octet
    #[error("unexpected trailing input at position {0}")]
    TrailingInput(usize),
}

impl HardwareAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

fn is_separator(c: u8) -> bool {
    matches!(c, b':' | b'-' | b'.')
}

fn hex_value(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Accepts six octets of one or two hex digits each. A single `:`, `-` or `.`
/// may precede any octet as long as a hex digit follows it.
impl FromStr for HardwareAddress {
    type Err = MacParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bytes = input.as_bytes();
        let at = |i: usize| bytes.get(i).copied();
        let mut pos = 0;
        let mut octets = [0u8; 6];

        for octet in octets.iter_mut() {
            if at(pos).is_some_and(is_separator) && at(pos + 1).and_then(hex_value).is_some() {
                pos += 1;
            }

            let high = at(pos)
                .and_then(hex_value)
                .ok_or(MacParseError::ExpectedHexDigit(pos))?;
            pos += 1;

            *octet = match at(pos).and_then(hex_value) {
                Some(low) => {
                    pos += 1;
                    high << 4 | low
                }
                None => high,
            };
        }

        if pos != bytes.len() {
            return Err(MacParseError::TrailingInput(pos));
        }

        Ok(Self::new(octets))
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl MagicPacket {
    /// Creates a magic packet for the given hardware address: six bytes of
    /// 0xFF followed by the address repeated 16 times.
    pub fn new(mac: HardwareAddress) -> Self {
        let mut packet = [0u8; MAGIC_PACKET_LEN];
        packet[..6].copy_from_slice(&SYNC_STREAM);

        // 16 occurrences of the MAC starting at the 7th byte
        for chunk in packet[6..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&mac.octets());
        }

        Self(packet)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello")]
    #[case("he-js-an-cc-dd-ee")]
    #[case("ab-cd")]
    #[case("ab-cd-ab-cd-ab-cd-ab-cd-ab")]
    #[case("-----abababababab")]
    #[case("")]
    #[case("aa:bb:cc:dd:ee:")]
    fn test_mac_rejects(#[case] input: &str) {
        assert!(input.parse::<HardwareAddress>().is_err());
    }

    #[rstest]
    #[case("AA:BB:CC:DD:EE:FF")]
    #[case("aa-bb-cc-dd-ee-ff")]
    #[case("aa.bb.cc.dd.ee.ff")]
    #[case("AA-bb:cc-DD.ee:ff")]
    #[case("aabbccddeeff")]
    fn test_mac_separators(#[case] input: &str) {
        let mac: HardwareAddress = input.parse().unwrap();
        assert_eq!(mac.octets(), [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn test_mac_single_digit_octets() {
        let mac: HardwareAddress = "0:1b:2:c:d:e".parse().unwrap();
        assert_eq!(mac.octets(), [0x00, 0x1b, 0x02, 0x0c, 0x0d, 0x0e]);
    }

    #[test]
    fn test_mac_error_position() {
        assert_eq!(
            "aa:bb:cc:dd:ee".parse::<HardwareAddress>(),
            Err(MacParseError::ExpectedHexDigit(14))
        );
        assert_eq!(
            "aa:bb:cc:dd:ee:ff:".parse::<HardwareAddress>(),
            Err(MacParseError::TrailingInput(17))
        );
    }

    #[test]
    fn test_mac_display() {
        let mac = HardwareAddress::new([0xAA, 0x0B, 0xCC, 0xDD, 0xEE, 0x01]);
        assert_eq!(mac.to_string(), "aa:0b:cc:dd:ee:01");
    }

    #[test]
    fn test_magic() {
        let mac = HardwareAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        let pkt = MagicPacket::new(mac);
        let bytes = pkt.as_bytes();

        assert_eq!(bytes.len(), 102);

        // starts with padding
        assert_eq!(&bytes[..6], &[255; 6]);

        // followed by the mac, 16 times over
        for k in 0..16 {
            assert_eq!(&bytes[6 + 6 * k..12 + 6 * k], &mac.octets());
        }
    }
}
