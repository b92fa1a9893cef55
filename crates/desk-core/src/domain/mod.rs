//! Domain entities for Desk Hotkeys.
//!
//! Pure logic with no I/O.  Everything the application layer decides is
//! decided here:
//!
//! - **`combo`** – which key edges become `up`/`down`/`stop`/preset commands.
//! - **`bindings`** – the shortcut table the state machine runs over.
//! - **`reconnect`** – when a run of failed dispatches means the desk's
//!   address is stale.
//! - **`identity`** / **`address`** – how the desk is recognised and reached.

pub mod address;
pub mod bindings;
pub mod combo;
pub mod identity;
pub mod reconnect;
