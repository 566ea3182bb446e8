//! Employee rows and the identities the tooling manages.
//!
//! [`EmployeeRow`] mirrors the raw columns of `pronto_employees`. Nothing here
//! decrypts transparently: use [`decrypt_email`] and [`decrypt_name`] when a
//! plaintext value is actually needed.

use pronto_core::{CredentialCipher, OpsResult};
use serde::Serialize;
use sqlx::FromRow;

use crate::roles::Role;
use crate::scopes::ScopeSet;
use crate::value_types::NormalizedEmail;

/// A stored `pronto_employees` row, columns as persisted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct EmployeeRow {
    /// Surrogate key rendered as text; never interpreted.
    pub id: String,
    pub identifier_hash: Option<String>,
    pub credential_hash: Option<String>,
    pub encrypted_name: Option<String>,
    pub encrypted_email: Option<String>,
    pub role: String,
    /// JSON array of scope tags as stored.
    pub allowed_scopes: String,
    pub is_active: bool,
}

impl EmployeeRow {
    /// The stored role, if it is one the platform knows.
    pub fn parsed_role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    /// The stored scope set. `None` when the column is not a JSON array.
    pub fn parsed_scopes(&self) -> Option<ScopeSet> {
        ScopeSet::from_json(&self.allowed_scopes).ok()
    }

    /// Whether the row carries exactly the canonical scopes of `role`.
    pub fn has_canonical_scopes(&self, role: Role) -> bool {
        self.parsed_scopes()
            .is_some_and(|scopes| scopes == role.canonical_scopes())
    }

    pub fn has_identifier_hash(&self) -> bool {
        self.identifier_hash
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty())
    }
}

/// Column values for a freshly created employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEmployee {
    pub identifier_hash: String,
    pub credential_hash: String,
    pub encrypted_name: String,
    pub encrypted_email: String,
    pub role: Role,
    pub allowed_scopes: ScopeSet,
}

impl NewEmployee {
    /// Hashes and encrypts a target into insertable columns.
    pub fn seal(
        cipher: &impl CredentialCipher,
        target: &EmployeeTarget,
        password: &str,
    ) -> OpsResult<Self> {
        let email = target.email.as_str();
        let sealed = || -> OpsResult<Self> {
            Ok(Self {
                identifier_hash: cipher.hash_identifier(email)?,
                credential_hash: cipher.hash_credentials(email, password)?,
                encrypted_name: cipher.encrypt_string(&target.display_name)?,
                encrypted_email: cipher.encrypt_string(email)?,
                role: target.role,
                allowed_scopes: target.role.canonical_scopes(),
            })
        };
        sealed().map_err(|e| e.with_email(email))
    }
}

/// A declared operational identity: the repair engine brings its row to
/// canonical state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTarget {
    pub email: NormalizedEmail,
    pub display_name: String,
    pub role: Role,
}

impl EmployeeTarget {
    pub fn new(email: &str, display_name: impl Into<String>, role: Role) -> OpsResult<Self> {
        Ok(Self {
            email: NormalizedEmail::new(email)?,
            display_name: display_name.into(),
            role,
        })
    }
}

/// The five operational identities every environment carries.
pub fn default_targets() -> Vec<EmployeeTarget> {
    [
        ("admin@cafeteria.test", "Cafeteria Admin", Role::Admin),
        ("waiter@cafeteria.test", "Cafeteria Waiter", Role::Waiter),
        ("chef@cafeteria.test", "Cafeteria Chef", Role::Chef),
        ("cashier@cafeteria.test", "Cafeteria Cashier", Role::Cashier),
        ("system@cafeteria.test", "System Operator", Role::System),
    ]
    .into_iter()
    .map(|(email, display_name, role)| EmployeeTarget {
        email: NormalizedEmail::from_trusted(email),
        display_name: display_name.to_string(),
        role,
    })
    .collect()
}

/// Decrypts the stored email. `None` when the column is empty.
pub fn decrypt_email(
    cipher: &impl CredentialCipher,
    row: &EmployeeRow,
) -> OpsResult<Option<String>> {
    row.encrypted_email
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| cipher.decrypt_string(v))
        .transpose()
}

/// Decrypts the stored display name. `None` when the column is empty.
pub fn decrypt_name(
    cipher: &impl CredentialCipher,
    row: &EmployeeRow,
) -> OpsResult<Option<String>> {
    row.encrypted_name
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| cipher.decrypt_string(v))
        .transpose()
}

/// Replaces the email of a row: both the ciphertext and the identifier hash
/// move together.
pub fn set_email(
    cipher: &impl CredentialCipher,
    row: &mut EmployeeRow,
    plaintext: &str,
) -> OpsResult<()> {
    let email = NormalizedEmail::new(plaintext)?;
    row.identifier_hash = Some(cipher.hash_identifier(email.as_str())?);
    row.encrypted_email = Some(cipher.encrypt_string(email.as_str())?);
    Ok(())
}
