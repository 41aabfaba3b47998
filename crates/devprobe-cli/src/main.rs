// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// devprobe: print the `getDeviceInfo` reply for the current host.
//
// Without an argument the detector config is read from `config.json` in the
// bridge's files directory, falling back to the built-in defaults.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use devprobe_bridge::{DeviceInfoPlugin, GET_DEVICE_INFO, NativeIdentity, PluginCallback, platform_bridge};
use devprobe_core::DetectorConfig;
use devprobe_core::error::Result;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Parser)]
#[command(name = "devprobe")]
#[command(version)]
#[command(about = "Print device info and the emulator verdict for this host")]
struct Cli {
    /// Detector config (JSON). Must exist when given.
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "devprobe failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let bridge = platform_bridge();
    let files_dir = bridge.files_dir().ok();
    let config = load_config(cli.config.as_deref(), files_dir.as_deref().map(Path::new))?;

    tracing::info!(
        platform = bridge.platform_name(),
        policy = ?config.basic_policy,
        "devprobe starting"
    );

    let plugin = DeviceInfoPlugin::new(bridge, config);
    match plugin.bridge().time_zone_id() {
        Ok(zone) => tracing::info!(time_zone = %zone, "host time zone"),
        Err(e) => tracing::debug!(error = %e, "time zone unavailable"),
    }

    let callback = StdoutCallback::default();
    plugin.execute(GET_DEVICE_INFO, &callback);
    Ok(callback.succeeded.get())
}

/// An explicit path must load. The files-directory config is optional and
/// a broken one falls back to defaults.
fn load_config(explicit: Option<&Path>, files_dir: Option<&Path>) -> Result<DetectorConfig> {
    if let Some(path) = explicit {
        return DetectorConfig::load(path);
    }

    let Some(path) = files_dir.map(|dir| dir.join(CONFIG_FILE)) else {
        return Ok(DetectorConfig::default());
    };
    if !path.exists() {
        return Ok(DetectorConfig::default());
    }

    Ok(DetectorConfig::load(&path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
        DetectorConfig::default()
    }))
}

/// Writes the reply to stdout and the error to stderr.
#[derive(Default)]
struct StdoutCallback {
    succeeded: Cell<bool>,
}

impl PluginCallback for StdoutCallback {
    fn success(&self, reply: serde_json::Value) {
        match serde_json::to_string_pretty(&reply) {
            Ok(text) => {
                println!("{text}");
                self.succeeded.set(true);
            }
            Err(e) => tracing::error!(error = %e, "failed to render reply"),
        }
    }

    fn error(&self, message: String) {
        eprintln!("getDeviceInfo failed: {message}");
    }
}

#[cfg(test)]
mod tests {
    use devprobe_core::BasicPolicy;

    use super::*;

    #[test]
    fn defaults_without_any_config() {
        let config = load_config(None, None).unwrap();
        assert_eq!(config, DetectorConfig::default());

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(None, Some(dir.path())).unwrap(), DetectorConfig::default());
    }

    #[test]
    fn files_dir_config_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"basic_policy":"scored"}"#).unwrap();
        let config = load_config(None, Some(dir.path())).unwrap();
        assert_eq!(config.basic_policy, BasicPolicy::Scored);
        assert!(config.network_check);
    }

    #[test]
    fn broken_files_dir_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        assert_eq!(load_config(None, Some(dir.path())).unwrap(), DetectorConfig::default());
    }

    #[test]
    fn command_line_takes_one_optional_config() {
        let cli = Cli::try_parse_from(["devprobe"]).unwrap();
        assert_eq!(cli.config, None);

        let cli = Cli::try_parse_from(["devprobe", "/etc/devprobe.json"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/devprobe.json")));

        assert!(Cli::try_parse_from(["devprobe", "a.json", "b.json"]).is_err());
        assert!(Cli::try_parse_from(["devprobe", "--verbose"]).is_err());
    }

    #[test]
    fn explicit_config_must_load() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(load_config(Some(&missing), None).is_err());

        let path = dir.path().join("detector.json");
        std::fs::write(&path, r#"{"network_check":false}"#).unwrap();
        let config = load_config(Some(&path), Some(dir.path())).unwrap();
        assert!(!config.network_check);
    }
}
