//! Post-repair audit of managed employee rows.
//!
//! Each managed email is re-fetched by identifier hash and classified. When
//! several conditions hold, the first one in this order is reported:
//! `MISSING`, `INACTIVE`, `PASSWORD_DRIFT`, `SCOPE_DRIFT`.
//!
//! A row whose stored role differs from the declared role is `SCOPE_DRIFT`:
//! repair would rewrite its role, so it is not canonical.

use pronto_core::{CredentialCipher, OpsResult};
use pronto_db::EmployeeStore;
use pronto_models::{EmployeeRow, EmployeeTarget, NormalizedEmail, Role};
use serde::Serialize;
use std::fmt;

use crate::report::VerifyReport;
use crate::targets::{ResolvedTarget, resolve_targets};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Ok,
    PasswordDrift,
    ScopeDrift,
    Inactive,
    Missing,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::PasswordDrift => "PASSWORD_DRIFT",
            Self::ScopeDrift => "SCOPE_DRIFT",
            Self::Inactive => "INACTIVE",
            Self::Missing => "MISSING",
        }
    }

    pub fn is_drift(self) -> bool {
        !matches!(self, Self::Ok)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a managed row against its declared role and the credential
/// hash it should carry.
pub fn classify(
    row: Option<&EmployeeRow>,
    declared_role: Role,
    expected_credential_hash: &str,
) -> Classification {
    let Some(row) = row else {
        return Classification::Missing;
    };
    if !row.is_active {
        return Classification::Inactive;
    }
    if row.credential_hash.as_deref() != Some(expected_credential_hash) {
        return Classification::PasswordDrift;
    }
    if row.parsed_role() != Some(declared_role) || !row.has_canonical_scopes(declared_role) {
        return Classification::ScopeDrift;
    }
    Classification::Ok
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyEntry {
    pub email: NormalizedEmail,
    pub role: Role,
    pub status: Classification,
}

/// Audits every target. Reads only.
pub async fn run_verify<S, C>(
    store: &mut S,
    cipher: &C,
    targets: &[EmployeeTarget],
    password: &str,
) -> OpsResult<VerifyReport>
where
    S: EmployeeStore,
    C: CredentialCipher,
{
    let (resolved, _) = resolve_targets(cipher, targets)?;
    let mut entries = Vec::with_capacity(resolved.len());

    for ResolvedTarget {
        identifier_hash,
        target,
    } in resolved
    {
        let email = target.email.as_str();
        let expected = cipher
            .hash_credentials(email, password)
            .map_err(|e| e.with_email(email))?;
        let row = store
            .find_by_identifier_hash(&identifier_hash)
            .await
            .map_err(|e| e.with_email(email))?;

        let status = classify(row.as_ref(), target.role, &expected);
        if status.is_drift() {
            tracing::warn!(email = %email, role = %target.role, status = %status, "Drift detected");
        }
        entries.push(VerifyEntry {
            email: target.email,
            role: target.role,
            status,
        });
    }

    Ok(VerifyReport::new(entries))
}
