//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration from the
//! platform-appropriate directory (or an explicit path), supplies defaults
//! when the file or individual fields are missing, and validates the result.

pub mod config;
