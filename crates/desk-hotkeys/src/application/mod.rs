//! Application layer use cases for Desk Hotkeys.
//!
//! Use cases orchestrate `desk_core` domain objects and talk to the outside
//! world only through traits (`HttpTransport`, `NameResolver`,
//! `NeighborTable`, `CommandSink`), so each one can be tested without a
//! keyboard hook or a desk on the network.
//!
//! # Sub-modules
//!
//! - **`handle_hotkeys`** – Runs the combo state machine over captured key
//!   edges on the input thread.
//!
//! - **`send_command`** – Delivers each command as an independent task and
//!   applies the reconnect policy to the outcome.
//!
//! - **`resolve_address`** – Finds the desk by hostname probe or
//!   neighbor-table scan and publishes its address.

pub mod handle_hotkeys;
pub mod resolve_address;
pub mod send_command;
