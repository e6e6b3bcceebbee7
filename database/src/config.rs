use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::DatabaseError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://dice.db";
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGODB_DATABASE: &str = "dice_game";

/// Picks the first value present: command line, then environment, then the YAML file.
fn resolve(cli_arg: Option<String>, env_var: &str, yaml: Option<String>) -> Option<String> {
    cli_arg
        .or_else(|| std::env::var(env_var).ok())
        .or(yaml)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn from_cli_or_env_or_yaml(cli_arg: Option<String>, yaml_config: Option<String>) -> Self {
        let url = resolve(cli_arg, "DATABASE_URL", yaml_config)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Self { url, pool_size: 20 }
    }

    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }

    pub async fn create_pool(&self) -> Result<sqlx::SqlitePool, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&self.url)
            .map_err(|e| DatabaseError::Connection(e.to_string()))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(self.pool_size);
        if self.is_in_memory() {
            // every connection to an in-memory database gets its own empty database,
            // and the data is gone once that connection closes
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        pool_options
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub uri: String,
    pub database: String,
}

impl HistoryConfig {
    pub fn from_cli_or_env_or_yaml(
        cli_uri: Option<String>,
        cli_database: Option<String>,
        yaml_uri: Option<String>,
        yaml_database: Option<String>,
    ) -> Self {
        let uri = resolve(cli_uri, "MONGODB_URI", yaml_uri)
            .unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string());
        let database = resolve(cli_database, "MONGODB_DATABASE", yaml_database)
            .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string());

        Self { uri, database }
    }
}
