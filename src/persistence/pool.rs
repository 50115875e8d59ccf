//! Database pool lifecycle: one-time initialization at startup.
//!
//! [`initialize`] never panics and never aborts the process. It returns a
//! typed result and leaves the degraded-mode decision to the caller.

use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlSslMode};

use super::schema;
use crate::config::DatabaseConfig;
use crate::error::InitError;

/// Builds the pool without opening any connection.
///
/// The connect timeout doubles as the acquire timeout, so the first
/// acquire in [`initialize`] cannot hang past it.
///
/// # Errors
///
/// Returns [`InitError::MissingConfig`] if host, user or database name is
/// absent. No network call is made in that case.
pub fn build_pool(config: &DatabaseConfig) -> Result<MySqlPool, InitError> {
    let (Some(host), Some(user), Some(name)) = (&config.host, &config.user, &config.name) else {
        return Err(InitError::MissingConfig(config.missing_fields()));
    };

    let mut options = MySqlConnectOptions::new()
        .host(host)
        .port(config.port)
        .username(user)
        .database(name);
    if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
        options = options.password(password);
    }
    if config.accept_invalid_certs {
        options = options.ssl_mode(MySqlSslMode::Required);
    }

    Ok(MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect_lazy_with(options))
}

/// Builds the pool, verifies liveness with one connection, bootstraps the
/// schema on it and releases it back to the pool.
///
/// # Errors
///
/// - [`InitError::MissingConfig`] if required settings are absent.
/// - [`InitError::Connect`] if the first connection cannot be acquired.
/// - [`InitError::Schema`] if the table bootstrap fails.
pub async fn initialize(config: &DatabaseConfig) -> Result<MySqlPool, InitError> {
    let pool = build_pool(config)?;

    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(source) => return Err(InitError::Connect { pool, source }),
    };
    tracing::info!(
        host = config.host.as_deref().unwrap_or_default(),
        port = config.port,
        "MySQL connected"
    );

    if let Err(source) = schema::ensure_schema(&mut conn).await {
        drop(conn);
        return Err(InitError::Schema { pool, source });
    }

    drop(conn);
    Ok(pool)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: Some("127.0.0.1".to_string()),
            user: Some("app".to_string()),
            password: None,
            name: Some("board".to_string()),
            port: 1,
            max_connections: 2,
            connect_timeout: Duration::from_millis(500),
            accept_invalid_certs: false,
        }
    }

    #[tokio::test]
    async fn missing_settings_short_circuit() {
        let config = DatabaseConfig {
            host: None,
            name: None,
            ..unreachable_config()
        };

        let Err(err) = initialize(&config).await else {
            panic!("initialization must fail without host and name");
        };
        let InitError::MissingConfig(fields) = err else {
            panic!("expected MissingConfig");
        };
        assert_eq!(fields, vec!["DB_HOST", "DB_NAME"]);
    }

    #[tokio::test]
    async fn unreachable_server_keeps_unused_pool() {
        let Err(err) = initialize(&unreachable_config()).await else {
            panic!("nothing listens on port 1");
        };
        assert!(matches!(err, InitError::Connect { .. }));
        assert!(err.into_pool().is_some());
    }
}
