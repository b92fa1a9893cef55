//! Parser for address-resolution-cache (ARP / neighbor table) dumps.
//!
//! The dump is free-form text: one entry per line, in whatever layout the
//! platform's tool prints.  A line belongs to the desk when it contains the
//! desk's hardware address ([`DeviceIdentity::matches_line`]); the numeric
//! address is then taken from the first run of four dot-separated integers
//! on that line.
//!
//! Lines that match the hardware address but carry no valid IPv4 address
//! (e.g. `999.1.1.1`, or an incomplete entry) are counted as malformed and
//! skipped.  Parsing never fails as a whole.

use std::net::Ipv4Addr;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::domain::identity::DeviceIdentity;

/// Result of scanning a cache dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborScan {
    /// Address of the first well-formed entry for the device, if any.
    pub address: Option<Ipv4Addr>,
    /// Lines that matched the device but could not be parsed.
    pub malformed: usize,
}

fn ipv4_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)\.(\d+)").unwrap())
}

/// Scans `dump` for the entry belonging to `identity`.
pub fn scan_neighbor_dump(dump: &str, identity: &DeviceIdentity) -> NeighborScan {
    let mut scan = NeighborScan::default();

    for (line_no, line) in dump.lines().enumerate() {
        if !identity.matches_line(line) {
            continue;
        }
        match first_ipv4(line) {
            Some(ip) => {
                scan.address = Some(ip);
                return scan;
            }
            None => {
                debug!(line_no, line, "skipping malformed neighbor entry");
                scan.malformed += 1;
            }
        }
    }
    scan
}

/// Returns the first candidate on `line` that is a valid IPv4 address.
fn first_ipv4(line: &str) -> Option<Ipv4Addr> {
    ipv4_pattern()
        .find_iter(line)
        .find_map(|m| m.as_str().parse::<Ipv4Addr>().ok())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn desk() -> DeviceIdentity {
        "a4:cf:12:0b:3e:01".parse().unwrap()
    }

    const LINUX_DUMP: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         00:11:22:33:44:55     *        wlan0
192.168.1.42     0x1         0x2         a4:cf:12:0b:3e:01     *        wlan0
";

    #[test]
    fn test_scan_finds_device_in_linux_dump() {
        let scan = scan_neighbor_dump(LINUX_DUMP, &desk());
        assert_eq!(scan.address, Some(Ipv4Addr::new(192, 168, 1, 42)));
        assert_eq!(scan.malformed, 0);
    }

    #[test]
    fn test_scan_finds_device_in_macos_dump() {
        let dump = "\
? (192.168.1.1) at 0:11:22:33:44:55 on en0 ifscope [ethernet]
standingdesk.local (192.168.1.42) at a4:cf:12:b:3e:1 on en0 ifscope [ethernet]
";
        let scan = scan_neighbor_dump(dump, &desk());
        assert_eq!(scan.address, Some(Ipv4Addr::new(192, 168, 1, 42)));
    }

    #[test]
    fn test_scan_finds_device_in_windows_dump() {
        let dump = "\
Interface: 192.168.1.10 --- 0x7
  Internet Address      Physical Address      Type
  192.168.1.1           00-11-22-33-44-55     dynamic
  192.168.1.42          a4-cf-12-0b-3e-01     dynamic
";
        let scan = scan_neighbor_dump(dump, &desk());
        assert_eq!(scan.address, Some(Ipv4Addr::new(192, 168, 1, 42)));
    }

    #[test]
    fn test_scan_skips_malformed_matching_line() {
        // Arrange – first matching line has an out-of-range octet
        let dump = "\
999.168.1.42     0x1   0x2   a4:cf:12:0b:3e:01   *   wlan0
192.168.1.43     0x1   0x2   a4:cf:12:0b:3e:01   *   wlan0
";

        // Act
        let scan = scan_neighbor_dump(dump, &desk());

        // Assert
        assert_eq!(scan.address, Some(Ipv4Addr::new(192, 168, 1, 43)));
        assert_eq!(scan.malformed, 1);
    }

    #[test]
    fn test_scan_returns_none_when_device_absent() {
        let dump = "192.168.1.1  0x1  0x2  00:11:22:33:44:55  *  wlan0\n";
        let scan = scan_neighbor_dump(dump, &desk());
        assert_eq!(scan, NeighborScan::default());
    }

    #[test]
    fn test_scan_of_empty_dump_is_empty() {
        assert_eq!(scan_neighbor_dump("", &desk()), NeighborScan::default());
    }
}
