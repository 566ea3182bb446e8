#![allow(dead_code)]

use std::cell::Cell;

use pronto_core::{CredentialCipher, OpsError, OpsResult, PlatformCipher};
use pronto_db::MemoryEmployeeStore;
use pronto_models::{EmployeeRow, EmployeeTarget, NewEmployee, Role};

pub const PASSWORD: &str = "ChangeMe!123";

pub fn cipher() -> PlatformCipher {
    PlatformCipher::new(
        "test-identifier-pepper",
        "test-credential-pepper",
        "cHJvbnRvLWRldmVsb3BtZW50LW9ubHkta2V5LTAwMDE=",
    )
    .unwrap()
}

pub fn target(email: &str, name: &str, role: Role) -> EmployeeTarget {
    EmployeeTarget::new(email, name, role).unwrap()
}

/// A row exactly as the engine would have created it for `password`.
pub fn sealed_row(cipher: &PlatformCipher, target: &EmployeeTarget, password: &str) -> EmployeeRow {
    let new = NewEmployee::seal(cipher, target, password).unwrap();
    EmployeeRow {
        id: String::new(),
        identifier_hash: Some(new.identifier_hash),
        credential_hash: Some(new.credential_hash),
        encrypted_name: Some(new.encrypted_name),
        encrypted_email: Some(new.encrypted_email),
        role: new.role.as_str().to_string(),
        allowed_scopes: new.allowed_scopes.to_json(),
        is_active: true,
    }
}

pub fn row_for<'a>(
    store: &'a MemoryEmployeeStore,
    cipher: &PlatformCipher,
    email: &str,
) -> Option<&'a EmployeeRow> {
    let hash = cipher.hash_identifier(email).unwrap();
    store
        .rows()
        .iter()
        .find(|r| r.identifier_hash.as_deref() == Some(hash.as_str()))
}

/// Delegates to a real cipher but fails every `encrypt_string` after the
/// first `succeed` calls.
pub struct FlakyCipher {
    inner: PlatformCipher,
    succeed: usize,
    calls: Cell<usize>,
}

impl FlakyCipher {
    pub fn failing_after(succeed: usize) -> Self {
        Self {
            inner: cipher(),
            succeed,
            calls: Cell::new(0),
        }
    }
}

impl CredentialCipher for FlakyCipher {
    fn hash_identifier(&self, email: &str) -> OpsResult<String> {
        self.inner.hash_identifier(email)
    }

    fn hash_credentials(&self, email: &str, password: &str) -> OpsResult<String> {
        self.inner.hash_credentials(email, password)
    }

    fn encrypt_string(&self, plaintext: &str) -> OpsResult<String> {
        let calls = self.calls.get();
        self.calls.set(calls + 1);
        if calls >= self.succeed {
            return Err(OpsError::crypto("encryption key rejected"));
        }
        self.inner.encrypt_string(plaintext)
    }

    fn decrypt_string(&self, ciphertext: &str) -> OpsResult<String> {
        self.inner.decrypt_string(ciphertext)
    }
}
