//! PostgreSQL connection parameters.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: full connection string; when set it takes precedence
//! - `POSTGRES_HOST` (default `localhost`)
//! - `POSTGRES_PORT` (default `5432`)
//! - `POSTGRES_DB` (default `pronto`)
//! - `POSTGRES_USER` (default `pronto`)
//! - `POSTGRES_PASSWORD` (default `pronto123`, outside production only)
//! - `PRONTO_DB_CONNECT_TIMEOUT_SECS` (default `10`)

use std::fmt;
use std::time::Duration;

use pronto_core::{OpsError, OpsResult};

use crate::environment::{Environment, resolve_secret};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DB: &str = "pronto";
const DEFAULT_USER: &str = "pronto";
const DEFAULT_PASSWORD: &str = "pronto123";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Full connection URL overriding the discrete parameters.
    pub url: Option<String>,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_lookup(
        lookup: &dyn Fn(&str) -> Option<String>,
        environment: Environment,
    ) -> OpsResult<Self> {
        let host = match lookup("POSTGRES_HOST") {
            Some(host) if host.trim().is_empty() => {
                return Err(OpsError::config("POSTGRES_HOST must not be blank"));
            }
            Some(host) => host.trim().to_string(),
            None => DEFAULT_HOST.to_string(),
        };

        let port = match crate::non_empty(lookup, "POSTGRES_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                OpsError::config(format!("POSTGRES_PORT is not a valid port: '{}'", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let connect_timeout = match crate::non_empty(lookup, "PRONTO_DB_CONNECT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                OpsError::config(format!(
                    "PRONTO_DB_CONNECT_TIMEOUT_SECS is not a number of seconds: '{}'",
                    raw
                ))
            })?,
            None => Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let url = crate::non_empty(lookup, "DATABASE_URL");
        // The discrete password is irrelevant when a full URL is supplied.
        let password = if url.is_some() {
            crate::non_empty(lookup, "POSTGRES_PASSWORD").unwrap_or_default()
        } else {
            resolve_secret(lookup, environment, "POSTGRES_PASSWORD", DEFAULT_PASSWORD)?
        };

        Ok(Self {
            host,
            port,
            database: crate::non_empty(lookup, "POSTGRES_DB")
                .unwrap_or_else(|| DEFAULT_DB.to_string()),
            user: crate::non_empty(lookup, "POSTGRES_USER")
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password,
            url,
            connect_timeout,
        })
    }

    /// `host:port/database`, safe to log.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::lookup_from;

    #[test]
    fn test_defaults() {
        let config =
            DatabaseConfig::from_lookup(&lookup_from(&[]), Environment::Development).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "pronto");
        assert_eq!(config.user, "pronto");
        assert_eq!(config.password, "pronto123");
        assert_eq!(config.url, None);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let lookup = lookup_from(&[
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_DB", "pronto_qa"),
            ("POSTGRES_USER", "ops"),
            ("POSTGRES_PASSWORD", "s3cret"),
        ]);
        let config = DatabaseConfig::from_lookup(&lookup, Environment::Production).unwrap();
        assert_eq!(config.target(), "db.internal:6543/pronto_qa");
        assert_eq!(config.user, "ops");
        assert_eq!(config.password, "s3cret");
    }

    #[test]
    fn test_blank_host_is_rejected() {
        let lookup = lookup_from(&[("POSTGRES_HOST", " ")]);
        assert!(DatabaseConfig::from_lookup(&lookup, Environment::Development).is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let lookup = lookup_from(&[("POSTGRES_PORT", "not-a-port")]);
        let err = DatabaseConfig::from_lookup(&lookup, Environment::Development).unwrap_err();
        assert!(err.to_string().contains("POSTGRES_PORT"));
    }

    #[test]
    fn test_production_needs_password_without_url() {
        let lookup = lookup_from(&[]);
        assert!(DatabaseConfig::from_lookup(&lookup, Environment::Production).is_err());

        let lookup = lookup_from(&[("DATABASE_URL", "postgres://ops@db/pronto")]);
        let config = DatabaseConfig::from_lookup(&lookup, Environment::Production).unwrap();
        assert_eq!(config.url.as_deref(), Some("postgres://ops@db/pronto"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let lookup = lookup_from(&[("POSTGRES_PASSWORD", "hunter2")]);
        let config = DatabaseConfig::from_lookup(&lookup, Environment::Development).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
