//! Replays a repair plan against a store.

use pronto_core::OpsResult;
use pronto_db::EmployeeStore;

use super::plan::{FieldChange, RepairAction, RepairPlan};

/// Writes every action of the plan in order. The first failure aborts; the
/// caller's transaction is expected to discard what was already written.
pub async fn apply_plan<S: EmployeeStore>(store: &mut S, plan: &RepairPlan) -> OpsResult<()> {
    for action in &plan.actions {
        match action {
            RepairAction::Insert { target, employee } => {
                let email = target.email.as_str();
                let id = store
                    .insert(employee)
                    .await
                    .map_err(|e| e.with_email(email))?;
                tracing::info!(email = %email, role = %target.role, row_id = %id, "Inserted employee");
            }
            RepairAction::Update {
                target,
                id,
                changes,
            } => {
                let email = target.email.as_str();
                for change in changes {
                    apply_change(store, id, change)
                        .await
                        .map_err(|e| e.with_email(email))?;
                }
                if !changes.is_empty() {
                    tracing::info!(
                        email = %email,
                        row_id = %id,
                        changes = changes.len(),
                        "Repaired employee"
                    );
                }
            }
            RepairAction::Skip { .. } => {}
            RepairAction::SweepScopes { id, role, to, .. } => {
                store.update_scopes(id, to).await?;
                tracing::info!(row_id = %id, role = %role, scopes = %to, "Restored canonical scopes");
            }
        }
    }
    Ok(())
}

async fn apply_change<S: EmployeeStore>(
    store: &mut S,
    id: &str,
    change: &FieldChange,
) -> OpsResult<()> {
    match change {
        FieldChange::Credentials { credential_hash } => {
            store.update_credentials(id, credential_hash).await
        }
        FieldChange::Role { to, .. } => store.update_role(id, *to).await,
        FieldChange::Scopes { to, .. } => store.update_scopes(id, to).await,
        FieldChange::Activate => store.set_active(id, true).await,
    }
}
