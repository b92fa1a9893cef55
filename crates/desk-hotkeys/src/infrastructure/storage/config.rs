//! TOML-based configuration for Desk Hotkeys.
//!
//! The config file lives in the platform-appropriate directory:
//! - Windows:  `%APPDATA%\DeskHotkeys\config.toml`
//! - Linux:    `~/.config/desk-hotkeys/config.toml`
//! - macOS:    `~/Library/Application Support/DeskHotkeys/config.toml`
//!
//! Example:
//!
//! ```toml
//! [device]
//! mac_address = "a4:cf:12:0b:3e:01"
//! hostname = "standingdesk.local"
//!
//! [network]
//! request_timeout_secs = 5
//! retry_delay_secs = 2
//! max_errors = 3
//!
//! [[bindings.one_shot]]
//! name = "standing"
//! modifiers = ["ControlLeft"]
//! trigger = "Home"
//! command = "standing"
//! ```
//!
//! Every field has a serde default, so an empty or missing file is valid.
//! A `bindings.hold` or `bindings.one_shot` list replaces its defaults as a
//! whole; an absent list keeps them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use desk_core::{BindingError, Bindings, DeviceIdentity, IdentityError, DEFAULT_MAX_ERRORS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::resolve_address::{ResolverConfig, DEFAULT_HOSTNAME};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid mac_address: {0}")]
    InvalidMac(#[from] IdentityError),

    #[error("invalid bindings: {0}")]
    InvalidBindings(#[from] BindingError),

    #[error("max_errors must be at least 1")]
    ZeroMaxErrors,

    /// A `[network]` duration was set to zero.
    #[error("{field} must be at least 1 second")]
    ZeroDuration { field: &'static str },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub bindings: Bindings,
}

/// How the desk is found on the network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// Hardware address used by the ARP-cache strategy.  Empty disables it.
    #[serde(default)]
    pub mac_address: String,
    /// Hostname announced by the desk controller.
    #[serde(default = "default_hostname")]
    pub hostname: String,
}

/// Timeouts and the reconnect budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Pause between two address-resolution passes.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Failed commands tolerated before the address is re-resolved.
    #[serde(default = "default_max_errors")]
    pub max_errors: u32,
}

/// Process-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}
fn default_request_timeout_secs() -> u64 {
    5
}
fn default_retry_delay_secs() -> u64 {
    2
}
fn default_max_errors() -> u32 {
    DEFAULT_MAX_ERRORS
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mac_address: String::new(),
            hostname: default_hostname(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            max_errors: default_max_errors(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.identity()?;
        if self.network.max_errors == 0 {
            return Err(ConfigError::ZeroMaxErrors);
        }
        if self.network.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "request_timeout_secs",
            });
        }
        if self.network.retry_delay_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "retry_delay_secs",
            });
        }
        self.bindings.validate()?;
        Ok(())
    }

    /// The configured hardware address, or `None` when left empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMac`] when the address does not parse.
    pub fn identity(&self) -> Result<Option<DeviceIdentity>, ConfigError> {
        let mac = self.device.mac_address.trim();
        if mac.is_empty() {
            return Ok(None);
        }
        Ok(Some(mac.parse()?))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_secs)
    }

    /// Builds the address resolver settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMac`] when the address does not parse.
    pub fn resolver_config(&self) -> Result<ResolverConfig, ConfigError> {
        Ok(ResolverConfig {
            hostname: self.device.hostname.clone(),
            identity: self.identity()?,
            probe_timeout: self.request_timeout(),
            retry_delay: Duration::from_secs(self.network.retry_delay_secs),
        })
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves the platform config directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("DeskHotkeys"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("desk-hotkeys"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("DeskHotkeys")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
