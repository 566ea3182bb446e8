//! PostgreSQL-backed employee session.

use pronto_core::{OpsError, OpsResult};
use pronto_models::{EmployeeRow, NewEmployee, Role, ScopeSet};
use sqlx::{PgPool, Postgres, Transaction};

use crate::store::{EmployeeStore, TransactionalStore};

/// Column list shared by every read. The surrogate key is read as text and
/// `allowed_scopes` as its JSON text so the row stays a flat record.
const EMPLOYEE_COLUMNS: &str = "id::text AS id, identifier_hash, credential_hash, \
     encrypted_name, encrypted_email, role::text AS role, \
     COALESCE(allowed_scopes::text, '[]') AS allowed_scopes, \
     COALESCE(is_active, false) AS is_active";

/// A read-write transaction on `pronto_employees`.
///
/// Dropping the session without [`TransactionalStore::commit`] rolls back.
pub struct EmployeeSession {
    tx: Transaction<'static, Postgres>,
}

impl EmployeeSession {
    pub async fn begin(pool: &PgPool) -> OpsResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    async fn execute_update(&mut self, sql: &str, id: &str, bind: UpdateValue<'_>) -> OpsResult<()> {
        let query = sqlx::query(sql);
        let query = match bind {
            UpdateValue::Text(value) => query.bind(value),
            UpdateValue::Bool(value) => query.bind(value),
        };
        let affected = query
            .bind(id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        if affected != 1 {
            return Err(OpsError::store(format!(
                "expected to update employee {} but {} rows matched",
                id, affected
            )));
        }
        Ok(())
    }
}

enum UpdateValue<'a> {
    Text(&'a str),
    Bool(bool),
}

impl EmployeeStore for EmployeeSession {
    async fn find_by_identifier_hash(&mut self, hash: &str) -> OpsResult<Option<EmployeeRow>> {
        let sql = format!(
            "SELECT {} FROM pronto_employees WHERE identifier_hash = $1",
            EMPLOYEE_COLUMNS
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(hash)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn list_all(&mut self) -> OpsResult<Vec<EmployeeRow>> {
        let sql = format!("SELECT {} FROM pronto_employees ORDER BY id", EMPLOYEE_COLUMNS);
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn list_unhashed(&mut self) -> OpsResult<Vec<EmployeeRow>> {
        let sql = format!(
            "SELECT {} FROM pronto_employees \
             WHERE identifier_hash IS NULL OR identifier_hash = '' ORDER BY id",
            EMPLOYEE_COLUMNS
        );
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn insert(&mut self, employee: &NewEmployee) -> OpsResult<String> {
        let id = sqlx::query_scalar::<_, String>(
            "INSERT INTO pronto_employees
                (identifier_hash, credential_hash, encrypted_name, encrypted_email,
                 role, allowed_scopes, is_active)
             VALUES ($1, $2, $3, $4, $5, CAST($6 AS jsonb), true)
             RETURNING id::text",
        )
        .bind(&employee.identifier_hash)
        .bind(&employee.credential_hash)
        .bind(&employee.encrypted_name)
        .bind(&employee.encrypted_email)
        .bind(employee.role.as_str())
        .bind(employee.allowed_scopes.to_json())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn update_credentials(&mut self, id: &str, credential_hash: &str) -> OpsResult<()> {
        self.execute_update(
            "UPDATE pronto_employees SET credential_hash = $1 WHERE id::text = $2",
            id,
            UpdateValue::Text(credential_hash),
        )
        .await
    }

    async fn update_scopes(&mut self, id: &str, scopes: &ScopeSet) -> OpsResult<()> {
        let json = scopes.to_json();
        self.execute_update(
            "UPDATE pronto_employees SET allowed_scopes = CAST($1 AS jsonb) WHERE id::text = $2",
            id,
            UpdateValue::Text(&json),
        )
        .await
    }

    async fn update_role(&mut self, id: &str, role: Role) -> OpsResult<()> {
        self.execute_update(
            "UPDATE pronto_employees SET role = $1 WHERE id::text = $2",
            id,
            UpdateValue::Text(role.as_str()),
        )
        .await
    }

    async fn set_active(&mut self, id: &str, active: bool) -> OpsResult<()> {
        self.execute_update(
            "UPDATE pronto_employees SET is_active = $1 WHERE id::text = $2",
            id,
            UpdateValue::Bool(active),
        )
        .await
    }
}

impl TransactionalStore for EmployeeSession {
    async fn commit(self) -> OpsResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
