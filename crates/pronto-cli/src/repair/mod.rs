//! Identity repair.
//!
//! For each declared target the engine ensures a row exists under the
//! target's identifier hash, is active, carries the credential hash of the
//! default password, and holds exactly the canonical scopes of its role.
//! Rows outside the target set only get their scopes corrected.
//!
//! The whole batch runs on one transaction: the plan is computed first, then
//! replayed, then committed once. Any error drops the transaction, which rolls
//! back everything written so far.

pub mod apply;
pub mod plan;

use pronto_core::{CredentialCipher, OpsResult};
use pronto_db::TransactionalStore;
use pronto_models::EmployeeTarget;

pub use apply::apply_plan;
pub use plan::{FieldChange, RepairAction, RepairPlan, SkipReason, plan_repair};

use crate::report::RepairReport;

/// Runs the repair batch. With `dry_run` the plan is reported and the
/// transaction is dropped without any write.
pub async fn run_repair<S, C>(
    mut store: S,
    cipher: &C,
    targets: &[EmployeeTarget],
    password: &str,
    dry_run: bool,
) -> OpsResult<RepairReport>
where
    S: TransactionalStore,
    C: CredentialCipher,
{
    let plan = plan_repair(&mut store, cipher, targets, password).await?;
    tracing::info!(
        targets = targets.len(),
        writes = plan.write_count(),
        dry_run,
        "Repair plan computed"
    );

    if dry_run {
        return Ok(RepairReport::from_plan(&plan, true));
    }

    apply_plan(&mut store, &plan).await?;
    store.commit().await?;

    Ok(RepairReport::from_plan(&plan, false))
}
