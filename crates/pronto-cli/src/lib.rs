//! # Pronto CLI
//!
//! Employee credential and scope repair for the PRONTO platform.
//!
//! - [`repair`]: brings every managed employee row to canonical state in one
//!   transaction
//! - [`verify`]: audits managed rows and classifies drift
//! - [`report`]: text and JSON rendering for both
//!
//! ## Usage
//!
//! ```ignore
//! use pronto_cli::repair::run_repair;
//! use pronto_models::default_targets;
//!
//! let session = EmployeeSession::begin(&pool).await?;
//! let report = run_repair(session, &cipher, &default_targets(), password, false).await?;
//! ```

pub mod cli;
pub mod repair;
pub mod report;
pub mod targets;
pub mod verify;
