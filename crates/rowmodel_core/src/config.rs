//! Database configuration.

use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One environment block: the credentials and coordinates of a single
/// database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvConfig {
    /// Driver adapter name (`sqlite`, `mysql`, ...).
    pub adapter: String,
    /// Database name. For the sqlite adapter this is the file path,
    /// or `:memory:` for an in-memory database.
    pub name: String,
    /// Server host.
    pub host: String,
    /// User name.
    pub user: String,
    /// Password.
    pub pass: String,
    /// Server port.
    pub port: u16,
    /// Connection charset.
    pub charset: String,
}

impl EnvConfig {
    /// Renders the PDO-style connection string for this environment:
    /// `{adapter}:dbname={name};host={host};port={port};charset={charset}`.
    #[must_use]
    pub fn dsn(&self) -> String {
        format!(
            "{}:dbname={};host={};port={};charset={}",
            self.adapter, self.name, self.host, self.port, self.charset
        )
    }
}

/// Top-level configuration: a set of named environments and the key
/// of the active one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Key into `environments` selecting the active block.
    pub current_env: String,
    /// All known environment blocks.
    pub environments: HashMap<String, EnvConfig>,
}

impl DatabaseConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::invalid_config(e.to_string()))
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoreError::invalid_config(format!("{}: {e}", path.display())))?;
        Self::from_json(&contents)
    }

    /// Returns the active environment block.
    ///
    /// Fails with an invalid-config error when `current_env` names a
    /// missing environment.
    pub fn active_env(&self) -> CoreResult<&EnvConfig> {
        self.environments.get(&self.current_env).ok_or_else(|| {
            CoreError::invalid_config(format!(
                "missing environment block for current_env {:?}",
                self.current_env
            ))
        })
    }

    /// Builds a single-environment config, mostly useful in tests and
    /// demos.
    #[must_use]
    pub fn single(env_name: &str, env: EnvConfig) -> Self {
        let mut environments = HashMap::new();
        environments.insert(env_name.to_string(), env);
        Self {
            current_env: env_name.to_string(),
            environments,
        }
    }

    /// Builds a config for an in-memory sqlite database.
    #[must_use]
    pub fn sqlite_in_memory() -> Self {
        Self::single(
            "test",
            EnvConfig {
                adapter: "sqlite".to_string(),
                name: ":memory:".to_string(),
                host: "localhost".to_string(),
                user: String::new(),
                pass: String::new(),
                port: 0,
                charset: "utf8".to_string(),
            },
        )
    }
}
