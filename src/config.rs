//! Runtime configuration for the persistent repository.

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "catalog.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Database settings.
///
/// Sources in increasing priority: built-in defaults, an optional YAML file,
/// then `CATALOG_*` environment variables (a `.env` file is read first when
/// present).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("max_connections", i64::from(DEFAULT_MAX_CONNECTIONS))?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }

        builder
            .add_source(Environment::with_prefix("CATALOG").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
