//! Key material for the credential cipher.
//!
//! - `PRONTO_IDENTIFIER_PEPPER`: key for the email identifier hash
//! - `PRONTO_CREDENTIAL_PEPPER`: key for the credential hash
//! - `PRONTO_ENCRYPTION_KEY`: base64-encoded 32-byte AES-256-GCM key
//!
//! Development builds fall back to fixed keys so local stores stay readable
//! across runs. Production requires all three.

use std::fmt;

use pronto_core::{OpsResult, PlatformCipher};

use crate::environment::{Environment, resolve_secret};

const DEV_IDENTIFIER_PEPPER: &str = "pronto-dev-identifier-pepper";
const DEV_CREDENTIAL_PEPPER: &str = "pronto-dev-credential-pepper";
const DEV_ENCRYPTION_KEY: &str = "cHJvbnRvLWRldmVsb3BtZW50LW9ubHkta2V5LTAwMDE=";

#[derive(Clone, PartialEq, Eq)]
pub struct CipherConfig {
    identifier_pepper: String,
    credential_pepper: String,
    encryption_key: String,
}

impl CipherConfig {
    pub fn from_lookup(
        lookup: &dyn Fn(&str) -> Option<String>,
        environment: Environment,
    ) -> OpsResult<Self> {
        Ok(Self {
            identifier_pepper: resolve_secret(
                lookup,
                environment,
                "PRONTO_IDENTIFIER_PEPPER",
                DEV_IDENTIFIER_PEPPER,
            )?,
            credential_pepper: resolve_secret(
                lookup,
                environment,
                "PRONTO_CREDENTIAL_PEPPER",
                DEV_CREDENTIAL_PEPPER,
            )?,
            encryption_key: resolve_secret(
                lookup,
                environment,
                "PRONTO_ENCRYPTION_KEY",
                DEV_ENCRYPTION_KEY,
            )?,
        })
    }

    /// Builds the platform cipher; malformed key material is a crypto error.
    pub fn build(&self) -> OpsResult<PlatformCipher> {
        PlatformCipher::new(
            &self.identifier_pepper,
            &self.credential_pepper,
            &self.encryption_key,
        )
    }
}

impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConfig").finish_non_exhaustive()
    }
}
