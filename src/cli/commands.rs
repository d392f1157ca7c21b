use crate::config::ServerConfig;
use crate::demo::DemoSketch;
use crate::webserver::WebServer;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Pause between two iterations of the sketch loop
pub const LOOP_INTERVAL: Duration = Duration::from_millis(10);

/// Command-line interface for fwsim
#[derive(Parser, Debug)]
#[command(name = "fwsim")]
#[command(version, about = "Firmware web-handler simulator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the demo sketch until interrupted
    Serve {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// TCP port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind
        #[arg(long)]
        addr: Option<String>,

        /// Realm advertised in Basic auth challenges
        #[arg(long)]
        realm: Option<String>,
    },
}

/// Parse the process arguments and run the selected command.
///
/// # Errors
///
/// Propagates configuration, bind and signal registration failures.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Run an already parsed command line.
///
/// # Errors
///
/// Propagates configuration, bind and signal registration failures.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            port,
            addr,
            realm,
        } => {
            let config = resolve_config(config.as_deref(), port, addr, realm)?;
            serve(config)
        }
    }
}

/// Layer defaults, the optional file, `FWSIM_*` variables and flag values.
///
/// # Errors
///
/// Fails when the file cannot be loaded or an environment value is invalid.
pub fn resolve_config(
    path: Option<&Path>,
    port: Option<u16>,
    addr: Option<String>,
    realm: Option<String>,
) -> Result<ServerConfig> {
    resolve_config_with(path, port, addr, realm, |key| std::env::var(key).ok())
}

/// [`resolve_config`] with `lookup` standing in for the process environment.
///
/// # Errors
///
/// Fails when the file cannot be loaded or a looked-up value is invalid.
pub fn resolve_config_with<F>(
    path: Option<&Path>,
    port: Option<u16>,
    addr: Option<String>,
    realm: Option<String>,
    lookup: F,
) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match path {
        Some(p) => ServerConfig::load(p)?,
        None => ServerConfig::default(),
    };
    let mut config = base.apply_overrides(lookup)?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(addr) = addr {
        config.bind_addr = addr;
    }
    if let Some(realm) = realm {
        config.realm = realm;
    }
    Ok(config)
}

fn serve(config: ServerConfig) -> Result<()> {
    let server = WebServer::with_config(config);
    let sketch = DemoSketch::new(server.clone());
    sketch.setup();
    server.begin()?;
    info!(addr = ?server.local_addr(), "Demo sketch running");

    let shutdown = shutdown_flag().context("Failed to register signal handlers")?;
    while !shutdown.load(Ordering::Relaxed) {
        sketch.loop_once();
        std::thread::sleep(LOOP_INTERVAL);
    }

    info!("Shutdown requested");
    server.stop()?;
    Ok(())
}

#[cfg(unix)]
fn shutdown_flag() -> std::io::Result<Arc<AtomicBool>> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let flag = Arc::new(AtomicBool::new(false));
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let raised = Arc::clone(&flag);
    std::thread::Builder::new()
        .name("fwsim-signals".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!(signal = sig, "Signal received");
                raised.store(true, Ordering::Relaxed);
            }
        })?;
    Ok(flag)
}

#[cfg(not(unix))]
fn shutdown_flag() -> std::io::Result<Arc<AtomicBool>> {
    // no signal integration: the process runs until killed
    Ok(Arc::new(AtomicBool::new(false)))
}
