//! The desk's resolved numeric network address.
//!
//! A [`DeviceAddress`] is always numeric: the hostname probe resolves the
//! name once and stores the result, so command dispatch never pays for a
//! name lookup (mDNS `.local` lookups can take a second or more).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::protocol::command::DeskCommand;

/// A syntactically valid numeric address of the desk controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress(IpAddr);

impl DeviceAddress {
    pub fn new(ip: IpAddr) -> Self {
        Self(ip)
    }

    /// `http://<ip>` (IPv6 addresses are bracketed).
    pub fn base_url(&self) -> String {
        match self.0 {
            IpAddr::V4(v4) => format!("http://{v4}"),
            IpAddr::V6(v6) => format!("http://[{v6}]"),
        }
    }

    /// `http://<ip>/<command>`.
    pub fn command_url(&self, command: DeskCommand) -> String {
        format!("{}/{}", self.base_url(), command.as_path())
    }
}

impl From<IpAddr> for DeviceAddress {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl From<Ipv4Addr> for DeviceAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self(IpAddr::V4(ip))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
