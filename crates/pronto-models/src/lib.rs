//! # Pronto Models
//!
//! Data structures for the `pronto_employees` table and the operational
//! identities the tooling manages.
//!
//! # Modules
//!
//! - [`roles`]: the [`Role`] enum and its canonical scope table
//! - [`scopes`]: [`ScopeSet`], the set-valued `allowed_scopes` column
//! - [`employees`]: raw employee rows, inserts, and declared targets
//! - [`value_types`]: validated, normalized email addresses
//!
//! # Example
//!
//! ```ignore
//! use pronto_models::{Role, ScopeSet};
//!
//! let canonical = Role::System.canonical_scopes();
//! assert!(canonical.contains("admin"));
//! ```

pub mod employees;
pub mod roles;
pub mod scopes;
pub mod value_types;

// Re-export commonly used types at crate root for convenience
pub use employees::{
    EmployeeRow, EmployeeTarget, NewEmployee, decrypt_email, decrypt_name, default_targets,
    set_email,
};
pub use roles::Role;
pub use scopes::ScopeSet;
pub use value_types::NormalizedEmail;
