use std::fmt;

use pronto_core::{OpsError, OpsResult};

use crate::environment::Environment;

/// Plaintext credential seeded into every managed employee row.
///
/// Only acceptable outside production; see [`Environment::allows_builtin_secrets`].
pub const DEFAULT_SEED_PASSWORD: &str = "ChangeMe!123";

#[derive(Clone, PartialEq, Eq)]
pub struct SeedConfig {
    default_password: String,
}

impl SeedConfig {
    /// Wraps an explicit password, refusing blank credentials.
    pub fn new(default_password: impl Into<String>) -> OpsResult<Self> {
        let default_password = default_password.into();
        if default_password.trim().is_empty() {
            return Err(OpsError::config(
                "SEED_EMPLOYEE_PASSWORD must not be blank",
            ));
        }
        Ok(Self { default_password })
    }

    /// Reads `SEED_EMPLOYEE_PASSWORD`.
    ///
    /// A variable that is present but blank is an error even when a built-in
    /// default exists.
    pub fn from_lookup(
        lookup: &dyn Fn(&str) -> Option<String>,
        environment: Environment,
    ) -> OpsResult<Self> {
        match lookup("SEED_EMPLOYEE_PASSWORD") {
            Some(value) => Self::new(value),
            None if environment.allows_builtin_secrets() => Self::new(DEFAULT_SEED_PASSWORD),
            None => Err(OpsError::config(format!(
                "SEED_EMPLOYEE_PASSWORD must be set when PRONTO_ENV={}",
                environment
            ))),
        }
    }

    pub fn default_password(&self) -> &str {
        &self.default_password
    }
}

impl fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedConfig")
            .field("default_password", &"<redacted>")
            .finish()
    }
}
