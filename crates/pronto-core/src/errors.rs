//! Error taxonomy for the operational tooling.
//!
//! Every fallible operation reports one of three kinds: configuration,
//! store, or crypto. Errors optionally carry the email of the target that was
//! being processed so the binary can name it on stderr.

use std::fmt;

/// Result alias used throughout the workspace.
pub type OpsResult<T> = Result<T, OpsError>;

/// The kind of failure, as reported on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Store,
    Crypto,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "ConfigError",
            Self::Store => "StoreError",
            Self::Crypto => "CryptoError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    /// Missing or unusable configuration.
    #[error("{message}")]
    Config {
        message: String,
        email: Option<String>,
    },

    /// The database refused a connection, rejected a statement, or a
    /// constraint was violated.
    #[error("{message}")]
    Store {
        message: String,
        email: Option<String>,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// Hashing or encryption failed.
    #[error("{message}")]
    Crypto {
        message: String,
        email: Option<String>,
    },
}

impl OpsError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            email: None,
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            email: None,
            source: None,
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
            email: None,
        }
    }

    /// Attaches the offending target email. An email that is already set is
    /// kept, so the innermost context wins.
    #[must_use]
    pub fn with_email(mut self, target: impl Into<String>) -> Self {
        let slot = match &mut self {
            Self::Config { email, .. } | Self::Store { email, .. } | Self::Crypto { email, .. } => {
                email
            }
        };
        if slot.is_none() {
            *slot = Some(target.into());
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Store { .. } => ErrorKind::Store,
            Self::Crypto { .. } => ErrorKind::Crypto,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Config { email, .. } | Self::Store { email, .. } | Self::Crypto { email, .. } => {
                email.as_deref()
            }
        }
    }

    /// Single-line rendering written to stderr before the process exits.
    ///
    /// Format: `error[<Kind>] <email or -> : <message>`
    pub fn diagnostic_line(&self) -> String {
        format!(
            "error[{}] {}: {}",
            self.kind(),
            self.email().unwrap_or("-"),
            self
        )
    }
}

impl From<sqlx::Error> for OpsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store {
            message: format!("database error: {}", err),
            email: None,
            source: Some(err),
        }
    }
}
