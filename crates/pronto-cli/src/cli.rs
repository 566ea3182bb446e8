//! Command-line surface of `pronto-ops`.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pronto-ops")]
#[command(about = "PRONTO operations - employee credential and scope repair", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Bring every managed employee row to canonical state
    Repair {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,

        /// Compute and print the changes without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Audit managed employee rows (exit 2 on drift)
    Verify {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Exit status for an argument parse failure.
///
/// `--help` and `--version` succeed. Every other error is a usage error and
/// exits 1, since `verify` reserves 2 for drift.
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}
