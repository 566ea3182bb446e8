//! # Pronto Config
//!
//! Configuration types for the PRONTO operational tooling.
//!
//! Every value is resolved in this order:
//!
//! 1. the process environment
//! 2. the dotenv file (`PRONTO_ENV_FILE`, else `.env`)
//! 3. the built-in default
//!
//! `dotenvy` never overwrites variables that are already set, so loading the
//! file once at startup and then reading the environment gives that order.
//!
//! - [`environment`]: deployment environment and the secret-default policy
//! - [`database`]: PostgreSQL connection parameters
//! - [`seed`]: the default employee credential
//! - [`cipher`]: key material for the credential cipher
//!
//! # Example
//!
//! ```ignore
//! use pronto_config::{OpsConfig, load_dotenv};
//!
//! load_dotenv();
//! let config = OpsConfig::from_env()?;
//! ```

pub mod cipher;
pub mod database;
pub mod environment;
pub mod seed;

use std::path::{Path, PathBuf};

use pronto_core::OpsResult;

// Re-export commonly used types at crate root
pub use cipher::CipherConfig;
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use seed::SeedConfig;

/// Loads the dotenv file into the process environment without overriding
/// variables that are already set. Returns the path that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    let path = std::env::var("PRONTO_ENV_FILE").unwrap_or_else(|_| ".env".to_string());
    load_dotenv_file(Path::new(&path))
}

fn load_dotenv_file(path: &Path) -> Option<PathBuf> {
    match dotenvy::from_path(path) {
        Ok(()) => Some(path.to_path_buf()),
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable dotenv file");
            None
        }
    }
}

/// Reads a key from the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolves a key through `lookup`, treating empty values as unset.
pub(crate) fn non_empty(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.is_empty())
}

/// Everything the repair engine and the reporter need.
#[derive(Clone, Debug)]
pub struct OpsConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
    pub cipher: CipherConfig,
}

impl OpsConfig {
    pub fn from_env() -> OpsResult<Self> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> OpsResult<Self> {
        let environment = Environment::from_lookup(lookup)?;
        Ok(Self {
            database: DatabaseConfig::from_lookup(lookup, environment)?,
            seed: SeedConfig::from_lookup(lookup, environment)?,
            cipher: CipherConfig::from_lookup(lookup, environment)?,
            environment,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::lookup_from;
    use super::*;
    use pronto_core::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_dotenv_fills_unset_keys_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "PRONTO_DOTENV_TEST_FROM_FILE=file").unwrap();
        writeln!(file, "PRONTO_DOTENV_TEST_PRESET=file").unwrap();
        file.flush().unwrap();

        // SAFETY: these keys are unique to this test and nothing else reads them.
        unsafe {
            std::env::set_var("PRONTO_DOTENV_TEST_PRESET", "env");
            std::env::set_var("PRONTO_ENV_FILE", file.path());
        }

        assert_eq!(load_dotenv().as_deref(), Some(file.path()));
        assert_eq!(env_lookup("PRONTO_DOTENV_TEST_FROM_FILE").as_deref(), Some("file"));
        assert_eq!(env_lookup("PRONTO_DOTENV_TEST_PRESET").as_deref(), Some("env"));
    }

    #[test]
    fn test_missing_dotenv_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv_file(&dir.path().join("absent.env")), None);
    }

    #[test]
    fn test_defaults_resolve_in_development() {
        let config = OpsConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.seed.default_password(), "ChangeMe!123");
        assert!(config.cipher.build().is_ok());
    }

    #[test]
    fn test_production_requires_seed_password() {
        let lookup = lookup_from(&[
            ("PRONTO_ENV", "production"),
            ("POSTGRES_PASSWORD", "s3cret"),
            ("PRONTO_IDENTIFIER_PEPPER", "a"),
            ("PRONTO_CREDENTIAL_PEPPER", "b"),
            ("PRONTO_ENCRYPTION_KEY", "cHJvbnRvLWRldmVsb3BtZW50LW9ubHkta2V5LTAwMDE="),
        ]);
        let err = OpsConfig::from_lookup(&lookup).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("SEED_EMPLOYEE_PASSWORD"));
    }

    #[test]
    fn test_non_empty_filters_blank() {
        let lookup = lookup_from(&[("A", ""), ("B", "x")]);
        assert_eq!(non_empty(&lookup, "A"), None);
        assert_eq!(non_empty(&lookup, "B"), Some("x".to_string()));
        assert_eq!(non_empty(&lookup, "C"), None);
    }
}
