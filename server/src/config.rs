use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;
use database::{DatabaseConfig, HistoryConfig, RetryPolicy};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid listen address {0:?}")]
    InvalidAddr(String),
}

#[derive(Parser, Debug, Default)]
#[command(about = "Dice game backend")]
pub struct Params {
    /// Listen address [env: LISTEN_ADDR] [default: 0.0.0.0:3001]
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// SQLite URL for the session store [env: DATABASE_URL]
    #[arg(long)]
    pub database_url: Option<String>,

    /// MongoDB URI for the history store [env: MONGODB_URI]
    #[arg(long)]
    pub mongo_uri: Option<String>,

    /// MongoDB database name [env: MONGODB_DATABASE]
    #[arg(long)]
    pub mongo_database: Option<String>,

    /// Retries for a failed history write
    #[arg(long)]
    pub history_retries: Option<usize>,

    /// YAML file with any of the settings above
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Settings read from the YAML config file. Every key is optional.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub addr: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub mongo_uri: Option<String>,
    pub mongo_database: Option<String>,
    pub history_retries: Option<usize>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database: DatabaseConfig,
    pub history: HistoryConfig,
    pub history_retry: RetryPolicy,
}

impl ServerConfig {
    pub fn load(params: Params) -> Result<Self, ConfigError> {
        let file = match &params.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(params, file)
    }

    /// Command line beats environment, which beats the config file.
    pub fn resolve(params: Params, file: FileConfig) -> Result<Self, ConfigError> {
        let addr = match params.addr {
            Some(addr) => addr,
            None => match std::env::var("LISTEN_ADDR") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidAddr(raw))?,
                Err(_) => match file.addr {
                    Some(addr) => addr,
                    None => DEFAULT_ADDR
                        .parse()
                        .map_err(|_| ConfigError::InvalidAddr(DEFAULT_ADDR.to_string()))?,
                },
            },
        };

        let defaults = RetryPolicy::default();
        let retries = params
            .history_retries
            .or(file.history_retries)
            .unwrap_or(defaults.max_retries);

        Ok(Self {
            addr,
            database: DatabaseConfig::from_cli_or_env_or_yaml(
                params.database_url,
                file.database_url,
            ),
            history: HistoryConfig::from_cli_or_env_or_yaml(
                params.mongo_uri,
                params.mongo_database,
                file.mongo_uri,
                file.mongo_database,
            ),
            history_retry: RetryPolicy::new(retries, defaults.initial_delay),
        })
    }
}
