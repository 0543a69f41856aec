//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, where the credential is stored, the
//! request timeout and the last identifier used to sign in.
//!
//! Configuration is stored at `~/.config/dayflow-hrms/config.json`; the
//! `DAYFLOW_*` environment variables override individual fields.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::DEFAULT_TIMEOUT_SECS;
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config directory paths
const APP_NAME: &str = "dayflow-hrms";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API the SPA talks to in local development
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

pub const ENV_API_URL: &str = "DAYFLOW_API_URL";
pub const ENV_TOKEN_BACKEND: &str = "DAYFLOW_TOKEN_BACKEND";
pub const ENV_TIMEOUT_SECS: &str = "DAYFLOW_TIMEOUT_SECS";

/// Where the bearer credential is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    /// Nothing persisted; the session ends with the process
    Memory,
}

impl FromStr for TokenBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(TokenBackend::File),
            "keyring" => Ok(TokenBackend::Keyring),
            "memory" => Ok(TokenBackend::Memory),
            other => Err(anyhow!("Unknown token backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub token_backend: TokenBackend,
    pub request_timeout_secs: u64,
    pub last_identifier: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_backend: TokenBackend::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            last_identifier: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults if absent) and apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load the config file alone, without env overrides
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Record the identifier used to sign in.
    ///
    /// Only `last_identifier` changes on disk; command line and environment
    /// overrides in effect for this run are not persisted.
    pub fn remember_identifier(identifier: &str) -> Result<()> {
        Self::remember_identifier_in(&Self::config_path()?, identifier)
    }

    pub fn remember_identifier_in(path: &Path, identifier: &str) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.last_identifier = Some(identifier.to_string());
        stored.save_to(path)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Override fields from the environment. Invalid values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }

        if let Some(backend) = lookup(ENV_TOKEN_BACKEND) {
            match backend.parse() {
                Ok(backend) => self.token_backend = backend,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_TOKEN_BACKEND),
            }
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!(value = %secs, "Ignoring {}", ENV_TIMEOUT_SECS),
            }
        }
    }

    /// Token store for the configured backend, scoped to the API origin
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        Ok(match self.token_backend {
            TokenBackend::File => Arc::new(FileTokenStore::in_cache_dir(&self.api_base_url)?),
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::for_origin(&self.api_base_url)),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        })
    }
}
