//! # Pronto DB
//!
//! Connection bootstrap and the employee store for the PRONTO tooling.
//!
//! The tooling never shares a global handle: [`connect`] returns a
//! single-connection pool, [`EmployeeSession::begin`] opens the read-write
//! transaction every operation runs in, and the session is threaded
//! explicitly through the repair engine and the reporter. Dropping a session
//! without committing rolls it back.
//!
//! # Example
//!
//! ```ignore
//! use pronto_db::{EmployeeSession, connect};
//!
//! let pool = connect(&config.database).await?;
//! let mut session = EmployeeSession::begin(&pool).await?;
//! let row = session.find_by_identifier_hash(&hash).await?;
//! session.commit().await?;
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod session;
pub mod store;

use std::str::FromStr;

use pronto_config::DatabaseConfig;
use pronto_core::{OpsError, OpsResult};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::{MemoryEmployeeStore, MemoryTransaction};
pub use session::EmployeeSession;
pub use store::{EmployeeStore, TransactionalStore};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Opens a single-connection pool against the configured store.
///
/// The batch is sequential, so one connection is all it ever holds. Any
/// failure to reach the store is reported as a configuration error.
pub async fn connect(config: &DatabaseConfig) -> OpsResult<PgPool> {
    let options = match &config.url {
        Some(url) => PgConnectOptions::from_str(url).map_err(|e| {
            OpsError::config(format!("DATABASE_URL is not a valid connection string: {}", e))
        })?,
        None => PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database),
    };

    tracing::debug!(target = %config.target(), "Connecting to employee store");

    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(config.connect_timeout)
        .connect_with(options)
        .await
        .map_err(|e| OpsError::config(format!("cannot connect to {}: {}", config.target(), e)))
}
