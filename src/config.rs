use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::scenario::{self, Operation};

/// Environment variable that overrides `connection.url`
pub const DATABASE_URL_ENV: &str = "LEAGUE_DATABASE_URL";

/// Connection settings handed to the driver. Opaque to the session runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Database path or `file:` URI
    pub url: String,
    pub read_only: bool,
    pub create_if_missing: bool,
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "league.db".to_string(),
            read_only: false,
            create_if_missing: true,
            busy_timeout_ms: 5_000,
            foreign_keys: true,
        }
    }
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Same database, opened read-only and never created
    pub fn read_only(&self) -> Self {
        Self {
            read_only: true,
            create_if_missing: false,
            ..self.clone()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Operation lists run by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub autonomous: Vec<Operation>,
    pub transactional: Vec<Operation>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            autonomous: scenario::autonomous_reference(),
            transactional: scenario::transactional_reference(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub scenario: ScenarioConfig,
}

impl AppConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist. `LEAGUE_DATABASE_URL` wins over the file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            tracing::debug!(?path, "config file not found, using defaults");
            Self::default()
        };

        config.apply_env(env::var(DATABASE_URL_ENV).ok());
        Ok(config)
    }

    /// Apply the value of `LEAGUE_DATABASE_URL`, if set
    pub fn apply_env(&mut self, url: Option<String>) {
        if let Some(url) = url {
            self.connection.url = url;
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid TOML")
    }
}
