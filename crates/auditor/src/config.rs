use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::models::Roster;
use std::path::Path;

/// Roster compiled into the binary, used unless a roster file is configured.
pub const BUILTIN_ROSTER: &str = include_str!("../roster/core_nodes.json");

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub roster_path: Option<String>,
    pub jvcore_address: Option<String>,
}

impl Config {
    pub fn load(config_path: &Option<String>, env_file: &str) -> Result<Self> {
        dotenv::from_filename(env_file).ok();

        let mut config = if let Some(path) = config_path {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;

        Ok(config)
    }

    pub fn load_from_env(&mut self) {
        if let Ok(rpc_url) = std::env::var("RPC_URL") {
            self.rpc_url = Some(rpc_url);
        }
        if let Ok(roster_path) = std::env::var("ROSTER_PATH") {
            self.roster_path = Some(roster_path);
        }
        if let Ok(address) = std::env::var("JVCORE_ADDRESS") {
            self.jvcore_address = Some(address);
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: Option<String>) -> Self {
        if rpc_url.is_some() {
            self.rpc_url = rpc_url;
        }
        self
    }

    pub fn with_roster_path(mut self, roster_path: Option<String>) -> Self {
        if roster_path.is_some() {
            self.roster_path = roster_path;
        }
        self
    }

    pub fn with_jvcore_address(mut self, address: Option<String>) -> Self {
        if address.is_some() {
            self.jvcore_address = address;
        }
        self
    }

    pub fn get_rpc_url(&self) -> Result<String> {
        self.rpc_url.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "No node endpoint configured. Pass it as argument, set RPC_URL, or add rpc_url to the config file"
            )
        })
    }

    pub fn load_roster(&self) -> Result<Roster> {
        match &self.roster_path {
            Some(path) => Roster::load(Path::new(path))
                .with_context(|| format!("Failed to load roster from {path}")),
            None => Roster::from_json(BUILTIN_ROSTER).context("Built-in roster is invalid"),
        }
    }
}
