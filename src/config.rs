//! Service configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy` outside production). Two modes exist:
//!
//! - [`ConfigMode::Strict`]: database host, user and name must be supplied;
//!   nothing is invented for them.
//! - [`ConfigMode::Defaulted`]: missing database settings fall back to a
//!   local development server (`root@localhost/test_db`).
//!
//! A missing database setting is never fatal to the process; it only keeps
//! the database layer from initializing.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_PORT: u16 = 3306;
const DEFAULT_STATIC_DIR: &str = "client/dist";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How absent database settings are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigMode {
    /// Database host, user and name are required and have no fallback.
    Strict,
    /// Local-development fallbacks are applied to absent settings.
    #[default]
    Defaulted,
}

impl FromStr for ConfigMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "defaulted" | "default" | "dev" => Ok(Self::Defaulted),
            _ => Err(ConfigError::InvalidValue {
                key: "CONFIG_MODE",
                value: s.to_string(),
            }),
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Connection settings for the MySQL pool.
///
/// `host`, `user` and `name` are optional here because strict mode may
/// leave them unset; [`DatabaseConfig::missing_fields`] reports which of
/// them the pool manager will refuse to start without.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Server hostname (`DB_HOST`).
    pub host: Option<String>,
    /// Login user (`DB_USER`).
    pub user: Option<String>,
    /// Login password (`DB_PASSWORD`). May legitimately be absent.
    pub password: Option<String>,
    /// Database (schema) name (`DB_NAME`).
    pub name: Option<String>,
    /// Server port (`DB_PORT`, default 3306).
    pub port: u16,
    /// Upper bound on concurrently open connections (`DB_POOL_SIZE`).
    pub max_connections: u32,
    /// Bound on establishing a connection (`DB_CONNECT_TIMEOUT_SECS`).
    pub connect_timeout: Duration,
    /// Use TLS without verifying the server certificate
    /// (`DB_ACCEPT_INVALID_CERTS`).
    pub accept_invalid_certs: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("name", &self.name)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Returns the environment keys of required settings that are absent.
    ///
    /// An empty list means the pool manager may attempt a connection.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("DB_HOST", &self.host),
            ("DB_USER", &self.user),
            ("DB_NAME", &self.name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect()
    }

    fn from_lookup<F>(mode: ConfigMode, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_empty(lookup, "DB_HOST");
        let user = non_empty(lookup, "DB_USER");
        let password = lookup("DB_PASSWORD");
        let name = non_empty(lookup, "DB_NAME");
        let port = parse_or(lookup, "DB_PORT", DEFAULT_DB_PORT);

        match mode {
            ConfigMode::Strict => Self {
                host,
                user,
                password,
                name,
                port,
                max_connections: parse_or(lookup, "DB_POOL_SIZE", 5),
                connect_timeout: Duration::from_secs(parse_or(
                    lookup,
                    "DB_CONNECT_TIMEOUT_SECS",
                    30,
                )),
                accept_invalid_certs: parse_bool_or(lookup, "DB_ACCEPT_INVALID_CERTS", true),
            },
            ConfigMode::Defaulted => Self {
                host: host.or_else(|| Some("localhost".to_string())),
                user: user.or_else(|| Some("root".to_string())),
                password: password.or_else(|| Some(String::new())),
                name: name.or_else(|| Some("test_db".to_string())),
                port,
                max_connections: parse_or(lookup, "DB_POOL_SIZE", 10),
                connect_timeout: Duration::from_secs(parse_or(
                    lookup,
                    "DB_CONNECT_TIMEOUT_SECS",
                    10,
                )),
                accept_invalid_certs: parse_bool_or(lookup, "DB_ACCEPT_INVALID_CERTS", false),
            },
        }
    }
}

/// Which database settings were supplied, reported by `GET /health`.
///
/// Taken from the environment before any mode fallback is applied, so a
/// defaulted value never counts as supplied. Blank values count as unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsPresence {
    /// `DB_HOST` was supplied.
    pub host: bool,
    /// `DB_USER` was supplied.
    pub user: bool,
    /// `DB_PASSWORD` was supplied.
    pub password: bool,
    /// `DB_NAME` was supplied.
    pub name: bool,
}

impl SettingsPresence {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let supplied = |key: &str| non_empty(lookup, key).is_some();
        Self {
            host: supplied("DB_HOST"),
            user: supplied("DB_USER"),
            password: supplied("DB_PASSWORD"),
            name: supplied("DB_NAME"),
        }
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServiceConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Which of the two deployment flavours is in effect.
    pub mode: ConfigMode,
    /// Socket address the HTTP listener binds to.
    pub listen_addr: SocketAddr,
    /// Directory holding the built single-page client.
    pub static_dir: PathBuf,
    /// Upper bound on handling a single request.
    pub request_timeout: Duration,
    /// Tracing output format.
    pub log_format: LogFormat,
    /// Database pool settings.
    pub database: DatabaseConfig,
    /// Which database settings the environment supplied.
    pub settings: SettingsPresence,
}

impl ServiceConfig {
    /// Loads configuration from the process environment.
    ///
    /// Loads a `.env` file first unless `APP_ENV` is `production`, where the
    /// hosting platform injects variables directly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `CONFIG_MODE`, `LISTEN_HOST`
    /// or `LOG_FORMAT` is set to something unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let production = std::env::var("APP_ENV").is_ok_and(|v| v == "production");
        if !production {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServiceConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match non_empty(&lookup, "CONFIG_MODE") {
            Some(raw) => raw.parse()?,
            None => ConfigMode::default(),
        };

        let host_raw =
            non_empty(&lookup, "LISTEN_HOST").unwrap_or_else(|| DEFAULT_LISTEN_HOST.to_string());
        let host: IpAddr = host_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "LISTEN_HOST",
            value: host_raw.clone(),
        })?;
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);

        let log_format = match non_empty(&lookup, "LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let static_dir = non_empty(&lookup, "STATIC_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        Ok(Self {
            mode,
            listen_addr: SocketAddr::new(host, port),
            static_dir,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            log_format,
            database: DatabaseConfig::from_lookup(mode, &lookup),
            settings: SettingsPresence::from_lookup(&lookup),
        })
    }

    /// Logs the effective configuration, masking the password.
    pub fn log_summary(&self) {
        let db = &self.database;
        tracing::info!(
            mode = ?self.mode,
            addr = %self.listen_addr,
            static_dir = %self.static_dir.display(),
            db_host = db.host.as_deref().unwrap_or("<unset>"),
            db_user = db.user.as_deref().unwrap_or("<unset>"),
            db_password = if db.password.is_some() { "loaded" } else { "not loaded" },
            db_name = db.name.as_deref().unwrap_or("<unset>"),
            db_port = db.port,
            db_pool_size = db.max_connections,
            "configuration loaded"
        );
    }
}

/// Returns the trimmed value for `key`, treating empty strings as unset.
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses `key` as a boolean. Accepts `"true"`, `"1"`, `"false"`, `"0"`
/// (case-insensitive). Returns `default` otherwise.
fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key)
        .map(|v| v.to_ascii_lowercase())
        .as_deref()
    {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
