//! The employee store contract.
//!
//! Rows are addressed by their surrogate id rendered as text; lookups by
//! identity always go through the identifier hash.

use pronto_core::OpsResult;
use pronto_models::{EmployeeRow, NewEmployee, Role, ScopeSet};

/// Reads and writes `pronto_employees` rows.
#[allow(async_fn_in_trait)]
pub trait EmployeeStore {
    async fn find_by_identifier_hash(&mut self, hash: &str) -> OpsResult<Option<EmployeeRow>>;

    /// Every row, ordered by surrogate id.
    async fn list_all(&mut self) -> OpsResult<Vec<EmployeeRow>>;

    /// Rows whose identifier hash is null or empty.
    async fn list_unhashed(&mut self) -> OpsResult<Vec<EmployeeRow>>;

    /// Inserts an active row and returns its surrogate id.
    async fn insert(&mut self, employee: &NewEmployee) -> OpsResult<String>;

    async fn update_credentials(&mut self, id: &str, credential_hash: &str) -> OpsResult<()>;

    async fn update_scopes(&mut self, id: &str, scopes: &ScopeSet) -> OpsResult<()>;

    async fn update_role(&mut self, id: &str, role: Role) -> OpsResult<()>;

    async fn set_active(&mut self, id: &str, active: bool) -> OpsResult<()>;
}

/// A store scoped to one transaction.
///
/// `commit` consumes the store; dropping it without committing discards
/// every write made through it.
#[allow(async_fn_in_trait)]
pub trait TransactionalStore: EmployeeStore {
    async fn commit(self) -> OpsResult<()>;
}
