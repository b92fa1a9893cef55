//! Infrastructure layer for Desk Hotkeys.
//!
//! Contains OS-facing adapters: the global keyboard listener, HTTP and
//! address-lookup clients, and file-system storage.
//!
//! **Dependency rule**: this layer may depend on `application` and `desk_core`.
//! Only `handle_hotkeys` reaches back into it, for the `RawKeyEvent` type.

pub mod input_capture;
pub mod network;
pub mod storage;
