//! # Pronto Core
//!
//! Foundational types shared by the PRONTO operational tooling.
//!
//! - [`errors`]: the error taxonomy every operation reports through
//! - [`crypto`]: the credential and PII crypto contract, plus the platform
//!   implementation keyed from deployment configuration
//!
//! # Example
//!
//! ```ignore
//! use pronto_core::crypto::{CredentialCipher, PlatformCipher};
//!
//! let cipher = PlatformCipher::new(id_pepper, cred_pepper, &key)?;
//! let hash = cipher.hash_identifier("admin@cafeteria.test")?;
//! ```

pub mod crypto;
pub mod errors;

// Re-export commonly used types at crate root
pub use crypto::{CredentialCipher, PlatformCipher, normalize_email};
pub use errors::{ErrorKind, OpsError, OpsResult};
