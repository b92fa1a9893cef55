//! The desk's hardware (MAC) address, used as the fallback discovery key.
//!
//! Address-resolution-cache dumps format hardware addresses differently on
//! every platform:
//!
//! ```text
//! Linux  /proc/net/arp   192.168.1.42  0x1  0x2  a4:cf:12:0b:3e:01  *  wlan0
//! macOS  arp -a          ? (192.168.1.42) at a4:cf:12:b:3e:1 on en0 ifscope [ethernet]
//! Windows arp -a         192.168.1.42          a4-cf-12-0b-3e-01     dynamic
//! ```
//!
//! [`DeviceIdentity::matches_line`] therefore parses every token of a line as
//! a hardware address (either separator, one or two hex digits per octet)
//! and compares octets, so all three forms match the same identity.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a string is not a valid 48-bit hardware address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("hardware address is empty")]
    Empty,
    #[error("invalid hardware address: {0:?}")]
    Invalid(String),
}

/// An immutable 48-bit hardware address identifying the desk controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    octets: [u8; 6],
}

impl DeviceIdentity {
    /// Creates an identity from raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self { octets }
    }

    /// Returns `true` if `line` contains this hardware address in any of the
    /// common textual forms (case-insensitive).
    ///
    /// Only whole tokens are compared, so a longer token that merely starts
    /// with this address does not match.
    pub fn matches_line(&self, line: &str) -> bool {
        line.split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | ',' | ';'))
            .filter(|t| !t.is_empty())
            .filter_map(parse_octets)
            .any(|octets| octets == self.octets)
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.octets;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for DeviceIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }
        parse_octets(trimmed)
            .map(Self::new)
            .ok_or_else(|| IdentityError::Invalid(s.to_string()))
    }
}

/// Parses `aa:bb:cc:dd:ee:ff`, `aa-bb-cc-dd-ee-ff`, `a:b:c:d:e:f` or `aabbccddeeff`.
fn parse_octets(token: &str) -> Option<[u8; 6]> {
    let mut octets = [0u8; 6];

    if token.len() == 12 && token.chars().all(|c| c.is_ascii_hexdigit()) {
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&token[i * 2..i * 2 + 2], 16).ok()?;
        }
        return Some(octets);
    }

    let parts: Vec<&str> = token.split([':', '-']).collect();
    if parts.len() != 6 {
        return None;
    }
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        *octet = u8::from_str_radix(part, 16).ok()?;
    }
    Some(octets)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
