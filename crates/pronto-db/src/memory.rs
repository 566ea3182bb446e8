//! In-memory employee store for tests.
//!
//! Enforces the identifier-hash uniqueness constraint and models transactions:
//! [`MemoryEmployeeStore::begin`] stages writes on a copy of the table, and only
//! [`TransactionalStore::commit`] publishes them. Writes can be made to fail
//! after a given count to exercise rollback.

use pronto_core::{OpsError, OpsResult};
use pronto_models::{EmployeeRow, NewEmployee, Role, ScopeSet};

use crate::store::{EmployeeStore, TransactionalStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryEmployeeStore {
    rows: Vec<EmployeeRow>,
    next_id: u64,
    writes: usize,
    fail_writes_after: Option<usize>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a transaction over a staged copy of the table.
    pub fn begin(&mut self) -> MemoryTransaction<'_> {
        let staged = self.clone();
        MemoryTransaction {
            store: self,
            staged,
        }
    }

    /// Every write after the first `count` fails with a store error.
    pub fn fail_writes_after(&mut self, count: usize) {
        self.writes = 0;
        self.fail_writes_after = Some(count);
    }

    pub fn rows(&self) -> &[EmployeeRow] {
        &self.rows
    }

    pub fn get(&self, id: &str) -> Option<&EmployeeRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Inserts a row as-is, bypassing the engine. The id is assigned here.
    pub fn insert_raw(&mut self, mut row: EmployeeRow) -> OpsResult<String> {
        self.check_unique(row.identifier_hash.as_deref(), None)?;
        self.next_id += 1;
        row.id = self.next_id.to_string();
        let id = row.id.clone();
        self.rows.push(row);
        Ok(id)
    }

    /// Edits a row out of band.
    pub fn update_raw(&mut self, id: &str, edit: impl FnOnce(&mut EmployeeRow)) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                edit(row);
                true
            }
            None => false,
        }
    }

    /// Deletes a row out of band.
    pub fn remove(&mut self, id: &str) -> Option<EmployeeRow> {
        let index = self.rows.iter().position(|r| r.id == id)?;
        Some(self.rows.remove(index))
    }

    fn check_unique(&self, hash: Option<&str>, except_id: Option<&str>) -> OpsResult<()> {
        let Some(hash) = hash.filter(|h| !h.is_empty()) else {
            return Ok(());
        };
        let taken = self.rows.iter().any(|r| {
            r.identifier_hash.as_deref() == Some(hash) && Some(r.id.as_str()) != except_id
        });
        if taken {
            return Err(OpsError::store(
                "duplicate key value violates unique constraint on identifier_hash",
            ));
        }
        Ok(())
    }

    fn record_write(&mut self) -> OpsResult<()> {
        if let Some(limit) = self.fail_writes_after {
            if self.writes >= limit {
                return Err(OpsError::store("injected write failure"));
            }
        }
        self.writes += 1;
        Ok(())
    }

    fn row_mut(&mut self, id: &str) -> OpsResult<&mut EmployeeRow> {
        self.rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| OpsError::store(format!("expected to update employee {} but 0 rows matched", id)))
    }
}

impl EmployeeStore for MemoryEmployeeStore {
    async fn find_by_identifier_hash(&mut self, hash: &str) -> OpsResult<Option<EmployeeRow>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.identifier_hash.as_deref() == Some(hash))
            .cloned())
    }

    async fn list_all(&mut self) -> OpsResult<Vec<EmployeeRow>> {
        Ok(self.rows.clone())
    }

    async fn list_unhashed(&mut self) -> OpsResult<Vec<EmployeeRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| !r.has_identifier_hash())
            .cloned()
            .collect())
    }

    async fn insert(&mut self, employee: &NewEmployee) -> OpsResult<String> {
        self.record_write()?;
        self.insert_raw(EmployeeRow {
            id: String::new(),
            identifier_hash: Some(employee.identifier_hash.clone()),
            credential_hash: Some(employee.credential_hash.clone()),
            encrypted_name: Some(employee.encrypted_name.clone()),
            encrypted_email: Some(employee.encrypted_email.clone()),
            role: employee.role.as_str().to_string(),
            allowed_scopes: employee.allowed_scopes.to_json(),
            is_active: true,
        })
    }

    async fn update_credentials(&mut self, id: &str, credential_hash: &str) -> OpsResult<()> {
        self.record_write()?;
        self.row_mut(id)?.credential_hash = Some(credential_hash.to_string());
        Ok(())
    }

    async fn update_scopes(&mut self, id: &str, scopes: &ScopeSet) -> OpsResult<()> {
        self.record_write()?;
        self.row_mut(id)?.allowed_scopes = scopes.to_json();
        Ok(())
    }

    async fn update_role(&mut self, id: &str, role: Role) -> OpsResult<()> {
        self.record_write()?;
        self.row_mut(id)?.role = role.as_str().to_string();
        Ok(())
    }

    async fn set_active(&mut self, id: &str, active: bool) -> OpsResult<()> {
        self.record_write()?;
        self.row_mut(id)?.is_active = active;
        Ok(())
    }
}

/// Staged writes against a [`MemoryEmployeeStore`].
pub struct MemoryTransaction<'a> {
    store: &'a mut MemoryEmployeeStore,
    staged: MemoryEmployeeStore,
}

impl EmployeeStore for MemoryTransaction<'_> {
    async fn find_by_identifier_hash(&mut self, hash: &str) -> OpsResult<Option<EmployeeRow>> {
        self.staged.find_by_identifier_hash(hash).await
    }

    async fn list_all(&mut self) -> OpsResult<Vec<EmployeeRow>> {
        self.staged.list_all().await
    }

    async fn list_unhashed(&mut self) -> OpsResult<Vec<EmployeeRow>> {
        self.staged.list_unhashed().await
    }

    async fn insert(&mut self, employee: &NewEmployee) -> OpsResult<String> {
        self.staged.insert(employee).await
    }

    async fn update_credentials(&mut self, id: &str, credential_hash: &str) -> OpsResult<()> {
        self.staged.update_credentials(id, credential_hash).await
    }

    async fn update_scopes(&mut self, id: &str, scopes: &ScopeSet) -> OpsResult<()> {
        self.staged.update_scopes(id, scopes).await
    }

    async fn update_role(&mut self, id: &str, role: Role) -> OpsResult<()> {
        self.staged.update_role(id, role).await
    }

    async fn set_active(&mut self, id: &str, active: bool) -> OpsResult<()> {
        self.staged.set_active(id, active).await
    }
}

impl TransactionalStore for MemoryTransaction<'_> {
    async fn commit(self) -> OpsResult<()> {
        *self.store = self.staged;
        Ok(())
    }
}
