//! # desk-core
//!
//! Shared library for Desk Hotkeys containing the key-combination state
//! machine, the reconnect policy, and the device addressing types.
//!
//! This crate has zero dependencies on OS APIs, HTTP clients, or sockets.
//! Everything here can be unit-tested without a desk on the network.
//!
//! # Architecture overview
//!
//! Desk Hotkeys lets a user raise and lower a motorised desk with global
//! keyboard shortcuts.  The desk runs a tiny HTTP server; every shortcut is
//! translated into a `GET http://<desk>/<command>` request.
//!
//! - **`keymap`** – The [`Key`] identifier used by every layer.  Platform key
//!   codes are translated into it at the input-capture boundary.
//!
//! - **`domain`** – Pure logic: the [`ComboStateMachine`] that turns raw
//!   press/release events into start/stop gestures, the [`Bindings`] table it
//!   is driven by, the [`ReconnectPolicy`] failure budget, and the
//!   [`DeviceIdentity`] / [`DeviceAddress`] value types.
//!
//! - **`protocol`** – What goes over the wire: the [`DeskCommand`]
//!   vocabulary and the parser for address-resolution-cache dumps.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::address::DeviceAddress;
pub use domain::bindings::{BindingError, Bindings, HoldBinding, OneShotBinding};
pub use domain::combo::{ComboEvent, ComboStateMachine, KeyEvent, KeyState};
pub use domain::identity::{DeviceIdentity, IdentityError};
pub use domain::reconnect::{FailureVerdict, ReconnectPolicy, DEFAULT_MAX_ERRORS};
pub use keymap::{Key, KeyParseError};
pub use protocol::command::{CommandParseError, DeskCommand};
pub use protocol::neighbor::{scan_neighbor_dump, NeighborScan};
