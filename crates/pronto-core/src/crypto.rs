//! Credential and PII crypto used by the employee tooling.
//!
//! [`CredentialCipher`] is the contract the repair engine and the reporter
//! are written against. [`PlatformCipher`] is the deployment implementation:
//!
//! - identifier hash: hex HMAC-SHA256 over the normalized email
//! - credential hash: hex HMAC-SHA256 over `normalized email || 0x00 || password`
//! - PII encryption: `base64(nonce_12bytes || ciphertext || tag_16bytes)` with AES-256-GCM

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroize;

use crate::errors::{OpsError, OpsResult};

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Lowercases and trims an email. Every hash is computed over this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hashing and reversible encryption for employee rows.
///
/// Implementations must be deterministic for the two hash functions: the
/// repair engine compares their output by byte equality.
pub trait CredentialCipher {
    /// Deterministic fingerprint of the normalized email.
    fn hash_identifier(&self, email: &str) -> OpsResult<String>;

    /// Hash binding `(email, password)`.
    fn hash_credentials(&self, email: &str, password: &str) -> OpsResult<String>;

    fn encrypt_string(&self, plaintext: &str) -> OpsResult<String>;

    fn decrypt_string(&self, ciphertext: &str) -> OpsResult<String>;
}

/// Peppered HMAC hashing plus AES-256-GCM encryption.
#[derive(Clone)]
pub struct PlatformCipher {
    identifier_pepper: Vec<u8>,
    credential_pepper: Vec<u8>,
    key: [u8; KEY_LEN],
}

impl Drop for PlatformCipher {
    fn drop(&mut self) {
        self.identifier_pepper.zeroize();
        self.credential_pepper.zeroize();
        self.key.zeroize();
    }
}

impl fmt::Debug for PlatformCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformCipher")
            .field("identifier_pepper", &"<redacted>")
            .field("credential_pepper", &"<redacted>")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl PlatformCipher {
    /// Builds a cipher from the two peppers and a base64-encoded 32-byte key.
    pub fn new(
        identifier_pepper: &str,
        credential_pepper: &str,
        encryption_key_b64: &str,
    ) -> OpsResult<Self> {
        if identifier_pepper.is_empty() || credential_pepper.is_empty() {
            return Err(OpsError::crypto("hash pepper must not be empty"));
        }

        let mut bytes = base64::engine::general_purpose::STANDARD
            .decode(encryption_key_b64.trim())
            .map_err(|e| OpsError::crypto(format!("encryption key is not valid base64: {}", e)))?;
        if bytes.len() != KEY_LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(OpsError::crypto(format!(
                "encryption key has wrong length: {} (expected {})",
                len, KEY_LEN
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        Ok(Self {
            identifier_pepper: identifier_pepper.as_bytes().to_vec(),
            credential_pepper: credential_pepper.as_bytes().to_vec(),
            key,
        })
    }

    fn mac(pepper: &[u8], parts: &[&[u8]]) -> OpsResult<String> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(pepper)
            .map_err(|e| OpsError::crypto(format!("invalid hash pepper: {}", e)))?;
        for part in parts {
            mac.update(part);
        }
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn aead(&self) -> OpsResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|_| OpsError::crypto("invalid encryption key"))
    }
}

impl CredentialCipher for PlatformCipher {
    fn hash_identifier(&self, email: &str) -> OpsResult<String> {
        let normalized = normalize_email(email);
        Self::mac(&self.identifier_pepper, &[normalized.as_bytes()])
    }

    fn hash_credentials(&self, email: &str, password: &str) -> OpsResult<String> {
        let normalized = normalize_email(email);
        Self::mac(
            &self.credential_pepper,
            &[normalized.as_bytes(), &[0u8], password.as_bytes()],
        )
    }

    fn encrypt_string(&self, plaintext: &str) -> OpsResult<String> {
        let cipher = self.aead()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| OpsError::crypto("encryption failed"))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(base64::engine::general_purpose::STANDARD.encode(out))
    }

    fn decrypt_string(&self, ciphertext: &str) -> OpsResult<String> {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| OpsError::crypto(format!("ciphertext is not valid base64: {}", e)))?;
        if raw.len() <= NONCE_LEN {
            return Err(OpsError::crypto("ciphertext too short"));
        }

        let (nonce_bytes, body) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .aead()?
            .decrypt(Nonce::from_slice(nonce_bytes), body)
            .map_err(|_| OpsError::crypto("decryption failed"))?;

        String::from_utf8(plaintext)
            .map_err(|_| OpsError::crypto("decrypted value is not valid UTF-8"))
    }
}
