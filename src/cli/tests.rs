//! Unit tests for CLI commands

use crate::cli::{resolve_config_with, Cli, Commands};
use clap::Parser;
use std::io::Write;

#[test]
fn serve_parses_without_flags() {
    let cli = Cli::try_parse_from(["fwsim", "serve"]).unwrap();
    match cli.command {
        Commands::Serve {
            config,
            port,
            addr,
            realm,
        } => {
            assert!(config.is_none());
            assert!(port.is_none());
            assert!(addr.is_none());
            assert!(realm.is_none());
        }
    }
}

#[test]
fn serve_parses_all_flags() {
    let cli = Cli::try_parse_from([
        "fwsim", "serve", "--config", "sim.yaml", "-p", "8080", "--addr", "127.0.0.1", "--realm",
        "lab",
    ])
    .unwrap();
    let Commands::Serve {
        config,
        port,
        addr,
        realm,
    } = cli.command;
    assert_eq!(config.unwrap().to_string_lossy(), "sim.yaml");
    assert_eq!(port, Some(8080));
    assert_eq!(addr.as_deref(), Some("127.0.0.1"));
    assert_eq!(realm.as_deref(), Some("lab"));
}

#[test]
fn invalid_port_is_rejected_by_parser() {
    assert!(Cli::try_parse_from(["fwsim", "serve", "--port", "70000"]).is_err());
}

#[test]
fn flags_override_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bind_addr: 10.0.0.1\nport: 81\nrealm: file").unwrap();
    let cfg = resolve_config_with(
        Some(file.path()),
        Some(9000),
        None,
        Some("flag".into()),
        |_| None,
    )
    .unwrap();
    assert_eq!(cfg.bind_addr, "10.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.realm, "flag");
}

#[test]
fn environment_sits_between_file_and_flags() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bind_addr: 10.0.0.1\nport: 81\nrealm: file").unwrap();
    let env = |key: &str| match key {
        "FWSIM_BIND_ADDR" => Some("192.168.4.1".to_string()),
        "FWSIM_PORT" => Some("8081".to_string()),
        "FWSIM_REALM" => Some("env".to_string()),
        _ => None,
    };
    let cfg = resolve_config_with(Some(file.path()), None, None, Some("flag".into()), env).unwrap();
    assert_eq!(cfg.bind_addr, "192.168.4.1");
    assert_eq!(cfg.port, 8081);
    assert_eq!(cfg.realm, "flag");
}

#[test]
fn invalid_environment_port_is_an_error() {
    let env = |key: &str| (key == "FWSIM_PORT").then(|| "not-a-port".to_string());
    assert!(resolve_config_with(None, None, None, None, env).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let err = resolve_config_with(
        Some(std::path::Path::new("/definitely/not/here.yaml")),
        None,
        None,
        None,
        |_| None,
    )
    .unwrap_err();
    assert!(err.to_string().contains("cannot read config file"));
}
