use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub invoices: InvoiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Statements slower than this are logged at WARN.
    pub slow_statement_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceConfig {
    /// Leading segment of generated invoice numbers.
    pub number_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/invoice_dashboard".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                slow_statement_secs: 5,
                run_migrations: true,
            },
            invoices: InvoiceConfig {
                number_prefix: "INV".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `config/default.*`, then `APP__*` variables.
    /// `DATABASE_URL`, `SERVER_HOST` and `SERVER_PORT` win over everything.
    pub fn load() -> AppResult<Self> {
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Builder seeded with [`AppConfig::default`].
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let d = Self::default();
        Config::builder()
            .set_default("server.host", d.server.host)?
            .set_default("server.port", i64::from(d.server.port))?
            .set_default("database.url", d.database.url)?
            .set_default("database.max_connections", i64::from(d.database.max_connections))?
            .set_default("database.acquire_timeout_secs", d.database.acquire_timeout_secs as i64)?
            .set_default("database.slow_statement_secs", d.database.slow_statement_secs as i64)?
            .set_default("database.run_migrations", d.database.run_migrations)?
            .set_default("invoices.number_prefix", d.invoices.number_prefix)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
