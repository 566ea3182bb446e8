//! Pronto Observability
//!
//! Console logging for the operational tooling. Logs always go to stderr so
//! that stdout carries nothing but the command's report.
//!
//! # Examples
//!
//! ```no_run
//! pronto_observability::init_console_logging();
//! tracing::info!("ready");
//! ```

mod basic_logging;

pub use basic_logging::{default_filter, init_console_logging};
