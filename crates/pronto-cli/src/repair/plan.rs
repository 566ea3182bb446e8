//! Repair planning.
//!
//! The plan is computed entirely from reads: nothing is written until
//! [`super::apply::apply_plan`] replays it.

use std::collections::HashSet;

use pronto_core::{CredentialCipher, OpsResult};
use pronto_db::EmployeeStore;
use pronto_models::{EmployeeRow, EmployeeTarget, NewEmployee, Role, ScopeSet, decrypt_email};
use serde::Serialize;

use crate::targets::{ResolvedTarget, resolve_targets};

/// A single column correction on an existing managed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Credentials { credential_hash: String },
    Role { from: String, to: Role },
    Scopes { from: String, to: ScopeSet },
    Activate,
}

impl FieldChange {
    /// The column the change touches.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Credentials { .. } => "credential_hash",
            Self::Role { .. } => "role",
            Self::Scopes { .. } => "allowed_scopes",
            Self::Activate => "is_active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A row without identifier hash already carries this email.
    UnhashedLegacyRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    Insert {
        target: EmployeeTarget,
        employee: NewEmployee,
    },
    /// An empty `changes` list means the row is already canonical.
    Update {
        target: EmployeeTarget,
        id: String,
        changes: Vec<FieldChange>,
    },
    Skip {
        target: EmployeeTarget,
        reason: SkipReason,
        row_id: String,
    },
    /// A row outside the target set whose scopes do not match its role.
    SweepScopes {
        id: String,
        role: Role,
        from: String,
        to: ScopeSet,
    },
}

impl RepairAction {
    /// Whether replaying the action writes anything.
    pub fn writes(&self) -> bool {
        match self {
            Self::Insert { .. } | Self::SweepScopes { .. } => true,
            Self::Update { changes, .. } => !changes.is_empty(),
            Self::Skip { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairPlan {
    pub actions: Vec<RepairAction>,
    pub warnings: Vec<String>,
}

impl RepairPlan {
    pub fn write_count(&self) -> usize {
        self.actions.iter().filter(|a| a.writes()).count()
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Computes the corrections that bring every target, and the scopes of every
/// other row, to canonical state.
pub async fn plan_repair<S, C>(
    store: &mut S,
    cipher: &C,
    targets: &[EmployeeTarget],
    password: &str,
) -> OpsResult<RepairPlan>
where
    S: EmployeeStore,
    C: CredentialCipher,
{
    let (resolved, warnings) = resolve_targets(cipher, targets)?;
    let mut plan = RepairPlan {
        actions: Vec::with_capacity(resolved.len()),
        warnings,
    };

    let legacy = legacy_emails(store, cipher).await?;
    let mut managed_ids = HashSet::new();

    for ResolvedTarget {
        identifier_hash,
        target,
    } in resolved
    {
        let email = target.email.as_str().to_string();
        let existing = store
            .find_by_identifier_hash(&identifier_hash)
            .await
            .map_err(|e| e.with_email(&email))?;

        let action = match existing {
            Some(row) => {
                managed_ids.insert(row.id.clone());
                let changes = diff_row(cipher, &row, &target, password, &mut plan)
                    .map_err(|e| e.with_email(&email))?;
                RepairAction::Update {
                    id: row.id,
                    target,
                    changes,
                }
            }
            None => match legacy.iter().find(|(_, plain)| *plain == email) {
                Some((row_id, _)) => {
                    tracing::warn!(
                        email = %email,
                        row_id = %row_id,
                        "Row without identifier hash matches target; skipping without backfill"
                    );
                    plan.warn(format!(
                        "{} matches row {} which has no identifier hash; not backfilled, target skipped",
                        email, row_id
                    ));
                    RepairAction::Skip {
                        target,
                        reason: SkipReason::UnhashedLegacyRow,
                        row_id: row_id.clone(),
                    }
                }
                None => {
                    let employee = NewEmployee::seal(cipher, &target, password)?;
                    RepairAction::Insert { target, employee }
                }
            },
        };
        plan.actions.push(action);
    }

    for row in store.list_all().await? {
        if managed_ids.contains(&row.id) {
            continue;
        }
        if let Some(action) = sweep_row(&row, &mut plan) {
            plan.actions.push(action);
        }
    }

    Ok(plan)
}

fn diff_row(
    cipher: &impl CredentialCipher,
    row: &EmployeeRow,
    target: &EmployeeTarget,
    password: &str,
    plan: &mut RepairPlan,
) -> OpsResult<Vec<FieldChange>> {
    let email = target.email.as_str();
    let mut changes = Vec::new();

    let expected = cipher.hash_credentials(email, password)?;
    if row.credential_hash.as_deref() != Some(expected.as_str()) {
        changes.push(FieldChange::Credentials {
            credential_hash: expected,
        });
    }

    if row.parsed_role() != Some(target.role) {
        tracing::warn!(
            email = %email,
            stored = %row.role,
            declared = %target.role,
            "Stored role contradicts declared role; overwriting"
        );
        plan.warn(format!(
            "{} has stored role '{}' but is declared {}; role overwritten",
            email, row.role, target.role
        ));
        changes.push(FieldChange::Role {
            from: row.role.clone(),
            to: target.role,
        });
    }

    if !row.has_canonical_scopes(target.role) {
        changes.push(FieldChange::Scopes {
            from: row.allowed_scopes.clone(),
            to: target.role.canonical_scopes(),
        });
    }

    if !row.is_active {
        changes.push(FieldChange::Activate);
    }

    Ok(changes)
}

fn sweep_row(row: &EmployeeRow, plan: &mut RepairPlan) -> Option<RepairAction> {
    let Some(role) = row.parsed_role() else {
        tracing::warn!(row_id = %row.id, role = %row.role, "Unknown stored role; scopes left alone");
        plan.warn(format!(
            "row {} has unknown role '{}'; scopes left alone",
            row.id, row.role
        ));
        return None;
    };

    if row.has_canonical_scopes(role) {
        return None;
    }

    Some(RepairAction::SweepScopes {
        id: row.id.clone(),
        role,
        from: row.allowed_scopes.clone(),
        to: role.canonical_scopes(),
    })
}

/// Decrypted emails of rows that have no identifier hash.
///
/// These are only consulted to avoid inserting a duplicate identity; rows
/// that fail to decrypt are logged and ignored.
async fn legacy_emails<S, C>(store: &mut S, cipher: &C) -> OpsResult<Vec<(String, String)>>
where
    S: EmployeeStore,
    C: CredentialCipher,
{
    let mut emails = Vec::new();
    for row in store.list_unhashed().await? {
        match decrypt_email(cipher, &row) {
            Ok(Some(plain)) => emails.push((row.id, pronto_core::normalize_email(&plain))),
            Ok(None) => {
                tracing::debug!(row_id = %row.id, "Unhashed row has no encrypted email");
            }
            Err(e) => {
                tracing::warn!(row_id = %row.id, error = %e, "Cannot decrypt email of unhashed row");
            }
        }
    }
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pronto_core::PlatformCipher;
    use pronto_db::MemoryEmployeeStore;
    use pronto_models::default_targets;

    const PASSWORD: &str = "ChangeMe!123";

    fn cipher() -> PlatformCipher {
        PlatformCipher::new(
            "id-pepper",
            "cred-pepper",
            "cHJvbnRvLWRldmVsb3BtZW50LW9ubHkta2V5LTAwMDE=",
        )
        .unwrap()
    }

    fn canonical_row(c: &PlatformCipher, target: &EmployeeTarget) -> EmployeeRow {
        let new = NewEmployee::seal(c, target, PASSWORD).unwrap();
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

    #[tokio::test]
    async fn test_empty_store_plans_inserts() {
        let c = cipher();
        let mut store = MemoryEmployeeStore::new();
        let plan = plan_repair(&mut store, &c, &default_targets(), PASSWORD).await.unwrap();

        assert_eq!(plan.actions.len(), 5);
        assert!(plan.actions.iter().all(|a| matches!(a, RepairAction::Insert { .. })));
        assert_eq!(plan.write_count(), 5);
        assert!(plan.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_canonical_row_needs_nothing() {
        let c = cipher();
        let target = EmployeeTarget::new("chef@cafeteria.test", "Chef", Role::Chef).unwrap();
        let mut store = MemoryEmployeeStore::new();
        store.insert_raw(canonical_row(&c, &target)).unwrap();

        let plan = plan_repair(&mut store, &c, &[target], PASSWORD).await.unwrap();
        assert!(matches!(
            &plan.actions[..],
            [RepairAction::Update { changes, .. }] if changes.is_empty()
        ));
        assert_eq!(plan.write_count(), 0);
    }

    #[tokio::test]
    async fn test_drifted_row_collects_every_change() {
        let c = cipher();
        let target = EmployeeTarget::new("waiter@cafeteria.test", "Waiter", Role::Waiter).unwrap();
        let mut row = canonical_row(&c, &target);
        row.credential_hash = Some("stale".to_string());
        row.role = "chef".to_string();
        row.allowed_scopes = r#"["admin"]"#.to_string();
        row.is_active = false;

        let mut store = MemoryEmployeeStore::new();
        store.insert_raw(row).unwrap();

        let plan = plan_repair(&mut store, &c, &[target], PASSWORD).await.unwrap();
        let RepairAction::Update { changes, .. } = &plan.actions[0] else {
            panic!("expected update, got {:?}", plan.actions[0]);
        };
        let columns: Vec<&str> = changes.iter().map(FieldChange::column).collect();
        assert_eq!(
            columns,
            vec!["credential_hash", "role", "allowed_scopes", "is_active"]
        );
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("stored role 'chef'"));
    }

    #[tokio::test]
    async fn test_unhashed_legacy_row_skips_target() {
        let c = cipher();
        let target = EmployeeTarget::new("cashier@cafeteria.test", "Cashier", Role::Cashier).unwrap();
        let mut row = canonical_row(&c, &target);
        row.identifier_hash = None;

        let mut store = MemoryEmployeeStore::new();
        let legacy_id = store.insert_raw(row).unwrap();

        let plan = plan_repair(&mut store, &c, &[target], PASSWORD).await.unwrap();
        assert!(matches!(
            &plan.actions[0],
            RepairAction::Skip { row_id, reason: SkipReason::UnhashedLegacyRow, .. } if *row_id == legacy_id
        ));
        assert_eq!(plan.write_count(), 0);
        assert!(plan.warnings[0].contains("not backfilled"));
    }

    #[tokio::test]
    async fn test_sweep_fixes_stranger_scopes_only() {
        let c = cipher();
        let stranger = EmployeeTarget::new("temp@cafeteria.test", "Temp", Role::Waiter).unwrap();
        let mut row = canonical_row(&c, &stranger);
        row.allowed_scopes = r#"["admin","waiter"]"#.to_string();

        let mut store = MemoryEmployeeStore::new();
        let id = store.insert_raw(row).unwrap();

        let plan = plan_repair(&mut store, &c, &[], PASSWORD).await.unwrap();
        assert_eq!(
            plan.actions,
            vec![RepairAction::SweepScopes {
                id,
                role: Role::Waiter,
                from: r#"["admin","waiter"]"#.to_string(),
                to: Role::Waiter.canonical_scopes(),
            }]
        );
    }

    #[tokio::test]
    async fn test_sweep_leaves_unknown_roles_alone() {
        let c = cipher();
        let stranger = EmployeeTarget::new("odd@cafeteria.test", "Odd", Role::Waiter).unwrap();
        let mut row = canonical_row(&c, &stranger);
        row.role = "manager".to_string();

        let mut store = MemoryEmployeeStore::new();
        store.insert_raw(row).unwrap();

        let plan = plan_repair(&mut store, &c, &[], PASSWORD).await.unwrap();
        assert!(plan.actions.is_empty());
        assert!(plan.warnings[0].contains("unknown role 'manager'"));
    }
}
