//! Desk Hotkeys: entry point.
//!
//! Raises and lowers a network-attached standing desk from global keyboard
//! shortcuts.  By default:
//!
//! | Shortcut              | Effect                                  |
//! |-----------------------|-----------------------------------------|
//! | Alt + PgUp (hold)     | move up while held, stop on release     |
//! | Alt + PgDn (hold)     | move down while held, stop on release   |
//! | Super + PgUp          | go to the standing preset               |
//! | Super + PgDn          | go to the seating preset                |
//!
//! # Usage
//!
//! ```text
//! desk-hotkeys [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Config file [default: platform config dir]
//!   --mac <ADDR>           Desk hardware address, for the ARP-cache lookup
//!   --hostname <HOST>      Hostname the desk announces [default: standingdesk.local]
//!   --max-errors <N>       Failed commands tolerated before re-resolving
//!   --log-level <LEVEL>    error | warn | info | debug | trace
//!   --print-config         Print the effective configuration and exit
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable        | Description                          |
//! |-----------------|--------------------------------------|
//! | `DESK_CONFIG`   | Config file path                     |
//! | `DESK_MAC`      | Desk hardware address                |
//! | `DESK_HOSTNAME` | Hostname the desk announces          |
//! | `RUST_LOG`      | Full `tracing` filter; wins over `--log-level` |
//!
//! # Startup
//!
//! 1. Configuration is loaded and CLI overrides applied.
//! 2. Logging is initialised.
//! 3. The desk is located; this blocks until it is found or Ctrl+C.
//! 4. The keyboard listener starts and the hotkey loop runs on a blocking
//!    thread until Ctrl+C.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Context};
use clap::Parser;
use desk_core::ReconnectPolicy;
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use desk_hotkeys::application::handle_hotkeys::HandleHotkeysUseCase;
use desk_hotkeys::application::resolve_address::{AddressResolver, CurrentAddress};
use desk_hotkeys::application::send_command::{CommandSender, Dispatcher, HttpTransport};
use desk_hotkeys::infrastructure::input_capture::{global_hook::GlobalKeyboardSource, InputSource};
use desk_hotkeys::infrastructure::network::{
    http::ReqwestTransport, name_resolver::SystemNameResolver,
    neighbor_table::SystemNeighborTable,
};
use desk_hotkeys::infrastructure::storage::config::{self, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Drive a network-attached standing desk with global keyboard shortcuts.
#[derive(Debug, Parser)]
#[command(name = "desk-hotkeys", version)]
struct Cli {
    /// Path to the TOML config file.
    ///
    /// Defaults to `config.toml` in the platform config directory.  A missing
    /// file is not an error; built-in defaults are used.
    #[arg(long, env = "DESK_CONFIG")]
    config: Option<PathBuf>,

    /// Hardware address of the desk controller (e.g. `a4:cf:12:0b:3e:01`).
    ///
    /// Used to find the desk in the ARP cache when the hostname probe fails.
    #[arg(long, env = "DESK_MAC")]
    mac: Option<String>,

    /// Hostname the desk controller announces.
    #[arg(long, env = "DESK_HOSTNAME")]
    hostname: Option<String>,

    /// Number of failed commands tolerated before the desk is searched again.
    #[arg(long)]
    max_errors: Option<u32>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    fn load_app_config(&self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match config::config_file_path() {
                Ok(path) => config::load_config_from(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?,
                Err(_) => AppConfig::default(),
            },
        };
        self.apply_overrides(&mut cfg);
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(mac) = &self.mac {
            cfg.device.mac_address = mac.clone();
        }
        if let Some(hostname) = &self.hostname {
            cfg.device.hostname = hostname.clone();
        }
        if let Some(max_errors) = self.max_errors {
            cfg.network.max_errors = max_errors;
        }
        if let Some(level) = &self.log_level {
            cfg.agent.log_level = level.clone();
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load_app_config()?;

    if cli.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.agent.log_level)),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        hostname = %cfg.device.hostname,
        mac = %cfg.device.mac_address,
        "desk-hotkeys starting"
    );

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Wiring ────────────────────────────────────────────────────────────────
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new().context("failed to build HTTP client")?);
    let address = Arc::new(CurrentAddress::new());
    let resolver = Arc::new(AddressResolver::new(
        cfg.resolver_config()?,
        Arc::clone(&transport),
        Arc::new(SystemNameResolver),
        Arc::new(SystemNeighborTable::new()),
        Arc::clone(&address),
    ));

    // ── Initial resolution ────────────────────────────────────────────────────
    if resolver.resolve(&running).await.is_none() {
        info!("stopped before the desk was found");
        return Ok(());
    }

    let dispatcher = Dispatcher::new(
        CommandSender::new(transport, address, cfg.request_timeout()),
        ReconnectPolicy::new(cfg.network.max_errors),
        resolver,
        Arc::clone(&running),
        Handle::current(),
    );

    // ── Hotkey loop ───────────────────────────────────────────────────────────
    let source = GlobalKeyboardSource::new();
    let events = source.start().context("failed to start keyboard listener")?;
    let bindings = cfg.bindings.clone();
    let loop_running = Arc::clone(&running);
    let worker = tokio::task::spawn_blocking(move || {
        let mut use_case = HandleHotkeysUseCase::new(bindings, dispatcher);
        use_case.run(&events, &loop_running);
    });
    info!("listening for hotkeys; press Ctrl+C to quit");

    worker.await.context("hotkey loop panicked")?;
    source.stop();

    if running.swap(false, Ordering::Relaxed) {
        warn!("keyboard listener stopped unexpectedly");
        bail!("keyboard listener stopped; global key capture may be unavailable in this session");
    }

    info!("desk-hotkeys stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
