use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use serde::Deserialize;
use std::path::Path;

use crate::models::TierLimits;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which store backs the user directory and friend-request ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_total_slots")]
    pub total_slots: usize,
    #[serde(default = "default_reciprocal_limit")]
    pub reciprocal_limit: usize,
    #[serde(default = "default_recommended_limit")]
    pub recommended_limit: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            total_slots: default_total_slots(),
            reciprocal_limit: default_reciprocal_limit(),
            recommended_limit: default_recommended_limit(),
        }
    }
}

impl RankingSettings {
    pub fn tier_limits(&self) -> TierLimits {
        TierLimits {
            total_slots: self.total_slots,
            reciprocal_limit: self.reciprocal_limit,
        }
    }
}

fn default_total_slots() -> usize { 10 }
fn default_reciprocal_limit() -> usize { 5 }
fn default_recommended_limit() -> usize { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_cookie_name() -> String { "jwt".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load `config/default.toml`, then `config/local.toml`, then the environment
    ///
    /// Nested keys come from `TANDEM__SECTION__KEY` (e.g. `TANDEM__SERVER__PORT`).
    /// `DATABASE_URL`, `REDIS_URL` and `JWT_SECRET` win over everything else.
    pub fn load() -> Result<Self, ConfigError> {
        layered([
            File::with_name("config/default").required(false),
            File::with_name("config/local").required(false),
        ])
    }

    /// Same layering on top of a single explicit file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        layered([File::from(path.as_ref())])
    }
}

fn layered<I>(files: I) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = File<FileSourceFile, FileFormat>>,
{
    let mut builder = Config::builder();
    for file in files {
        builder = builder.add_source(file);
    }

    builder = builder.add_source(
        Environment::with_prefix("TANDEM")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    for (var, key) in [
        ("DATABASE_URL", "database.url"),
        ("REDIS_URL", "cache.redis_url"),
        ("JWT_SECRET", "auth.jwt_secret"),
    ] {
        if let Ok(value) = std::env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()?.try_deserialize()
}
