//! Declared targets resolved to identifier hashes.

use pronto_core::{CredentialCipher, OpsResult};
use pronto_models::EmployeeTarget;

/// A declared target together with the hash its row is looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub identifier_hash: String,
    pub target: EmployeeTarget,
}

/// Hashes every target in declared order.
///
/// Targets that hash to the same identifier collapse into one: the later
/// declaration replaces the earlier one in its original position, and a
/// warning naming both emails is returned.
pub fn resolve_targets(
    cipher: &impl CredentialCipher,
    targets: &[EmployeeTarget],
) -> OpsResult<(Vec<ResolvedTarget>, Vec<String>)> {
    let mut resolved: Vec<ResolvedTarget> = Vec::with_capacity(targets.len());
    let mut warnings = Vec::new();

    for target in targets {
        let email = target.email.as_str();
        let identifier_hash = cipher
            .hash_identifier(email)
            .map_err(|e| e.with_email(email))?;

        match resolved
            .iter_mut()
            .find(|r| r.identifier_hash == identifier_hash)
        {
            Some(existing) => {
                let message = format!(
                    "targets {} and {} share an identifier hash; the later declaration wins",
                    existing.target.email, target.email
                );
                tracing::warn!(
                    email = %target.email,
                    previous = %existing.target.email,
                    "Duplicate target identifier hash"
                );
                warnings.push(message);
                existing.target = target.clone();
            }
            None => resolved.push(ResolvedTarget {
                identifier_hash,
                target: target.clone(),
            }),
        }
    }

    Ok((resolved, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pronto_core::PlatformCipher;
    use pronto_models::{Role, default_targets};

    fn cipher() -> PlatformCipher {
        PlatformCipher::new(
            "id-pepper",
            "cred-pepper",
            "cHJvbnRvLWRldmVsb3BtZW50LW9ubHkta2V5LTAwMDE=",
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_resolve_without_warnings() {
        let (resolved, warnings) = resolve_targets(&cipher(), &default_targets()).unwrap();
        assert_eq!(resolved.len(), 5);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_later_duplicate_wins_in_place() {
        let targets = vec![
            EmployeeTarget::new("Admin@X.test", "First", Role::Admin).unwrap(),
            EmployeeTarget::new("chef@x.test", "Chef", Role::Chef).unwrap(),
            EmployeeTarget::new("admin@x.test", "Second", Role::System).unwrap(),
        ];
        let (resolved, warnings) = resolve_targets(&cipher(), &targets).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].target.display_name, "Second");
        assert_eq!(resolved[0].target.role, Role::System);
        assert_eq!(resolved[1].target.role, Role::Chef);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("admin@x.test"));
    }
}
