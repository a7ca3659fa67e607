//! Handles settings for the application. Configuration is written in
//! `settings.toml` and can be overridden with `SALDO_*` environment
//! variables (`__` separates nested keys, e.g. `SALDO_SERVER__PORT=8080`).
//!
//! See `settings.toml` for the configuration.
use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use engine::EngineConfig;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "saldo", version)]
struct Args {
    /// Config file path (TOML), without or with extension.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: Database,
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub max_range_days: i64,
    pub write_attempts: u32,
    pub retry_backoff_ms: u64,
    pub event_capacity: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            max_range_days: config.max_range_days,
            write_attempts: config.write_attempts,
            retry_backoff_ms: config.retry_backoff.as_millis() as u64,
            event_capacity: config.event_capacity,
        }
    }
}

impl Ledger {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_range_days: self.max_range_days,
            write_attempts: self.write_attempts,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            event_capacity: self.event_capacity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        Self::load(path)
    }

    fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SALDO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
