//! Normalized email addresses.
//!
//! Identifier hashes are computed over the trimmed, lowercased email, so the
//! tooling carries emails in that form from the moment a target is declared.

use pronto_core::{OpsError, OpsResult, normalize_email};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Normalizes and validates an email.
    ///
    /// Requires exactly one `@` with a non-empty local part and domain.
    pub fn new(raw: &str) -> OpsResult<Self> {
        let email = normalize_email(raw);
        let mut parts = email.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !valid || email.chars().any(char::is_whitespace) {
            return Err(OpsError::config(format!("invalid email address '{}'", raw.trim())));
        }
        Ok(Self(email))
    }

    /// Wraps a literal already in normalized form.
    pub(crate) fn from_trusted(email: &str) -> Self {
        Self(email.to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
