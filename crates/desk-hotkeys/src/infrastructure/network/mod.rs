//! Network infrastructure for Desk Hotkeys.
//!
//! # Sub-modules
//!
//! - **`http`** – `reqwest`-backed [`HttpTransport`](crate::application::send_command::HttpTransport)
//!   used for both desk commands and the hostname probe.
//!
//! - **`name_resolver`** – Hostname lookup through the system resolver
//!   (which handles `.local` names wherever mDNS is configured).
//!
//! - **`neighbor_table`** – Reads the host's ARP cache, from
//!   `/proc/net/arp` on Linux and `arp -a` elsewhere.

pub mod http;
pub mod name_resolver;
pub mod neighbor_table;
