use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Command line defaults read from `config.toml`
///
/// Every field is optional; flags given on the command line win.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,

    /// Aggregator deployment, defaults to the canonical Multicall3 address
    pub multicall: Option<Address>,

    #[serde(default)]
    pub abi_paths: Vec<String>,

    pub timeout_ms: Option<u64>,
}

impl Config {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// ABI directories with a leading `~` expanded
    pub fn abi_roots(&self) -> Vec<PathBuf> {
        self.abi_paths.iter().map(|path| expand_home(path)).collect()
    }
}

/// Load the config, falling back to defaults when it is missing or broken
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Config::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            Config::default()
        }
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str::<Config>(&content).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ETHBATCH_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("ethbatch").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("ethbatch").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "ethbatch", "ethbatch")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
