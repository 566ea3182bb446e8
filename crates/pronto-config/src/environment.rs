use std::fmt;
use std::str::FromStr;

use pronto_core::{OpsError, OpsResult};

/// Deployment environment, read from `PRONTO_ENV`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> OpsResult<Self> {
        match crate::non_empty(lookup, "PRONTO_ENV") {
            Some(raw) => raw.parse(),
            None => Ok(Self::default()),
        }
    }

    /// Built-in secrets (database password, seed password, peppers, key) are
    /// only acceptable outside production.
    pub fn allows_builtin_secrets(self) -> bool {
        !matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(OpsError::config(format!(
                "PRONTO_ENV has unknown value '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        })
    }
}

/// Resolves a secret: configured value, else the built-in default when the
/// environment permits it, else a configuration error.
pub(crate) fn resolve_secret(
    lookup: &dyn Fn(&str) -> Option<String>,
    environment: Environment,
    key: &str,
    builtin: &str,
) -> OpsResult<String> {
    match crate::non_empty(lookup, key) {
        Some(value) => Ok(value),
        None if environment.allows_builtin_secrets() => Ok(builtin.to_string()),
        None => Err(OpsError::config(format!(
            "{} must be set when PRONTO_ENV={}",
            key, environment
        ))),
    }
}
