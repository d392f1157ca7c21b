//! # CLI Module
//!
//! Command-line entry point of the `fwsim` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the bundled demo sketch on a real listener until SIGINT/SIGTERM:
//!
//! ```bash
//! fwsim serve --port 8080
//! fwsim serve --config fwsim.yaml --realm garage-door
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML [`ServerConfig`](crate::config::ServerConfig)
//! - `--port <N>` - TCP port (overrides file and `FWSIM_PORT`)
//! - `--addr <A>` - bind address (overrides file and `FWSIM_BIND_ADDR`)
//! - `--realm <R>` - Basic auth realm (overrides file and `FWSIM_REALM`)
//!
//! Precedence, lowest first: defaults, config file, environment, flags.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    resolve_config, resolve_config_with, run, run_cli, Cli, Commands, LOOP_INTERVAL,
};
