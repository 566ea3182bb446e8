use std::process::ExitCode;

use clap::Parser;
use pronto_cli::cli::{Cli, Commands, usage_exit_code};
use pronto_cli::{repair, verify};
use pronto_config::{OpsConfig, load_dotenv};
use pronto_core::OpsResult;
use pronto_db::EmployeeSession;
use pronto_models::default_targets;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv_path = load_dotenv();
    pronto_observability::init_console_logging();
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded dotenv file");
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return usage_exit(e),
    };

    let result = match cli.command {
        Commands::Repair { json, dry_run } => handle_repair(json, dry_run).await,
        Commands::Verify { json } => handle_verify(json).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.diagnostic_line());
            ExitCode::from(1)
        }
    }
}

fn usage_exit(err: clap::Error) -> ExitCode {
    let code = usage_exit_code(&err);
    let _ = err.print();
    ExitCode::from(code)
}

async fn handle_repair(json: bool, dry_run: bool) -> OpsResult<ExitCode> {
    let config = OpsConfig::from_env()?;
    let cipher = config.cipher.build()?;
    let targets = default_targets();

    let pool = pronto_db::connect(&config.database).await?;
    let session = EmployeeSession::begin(&pool).await?;
    let report = repair::run_repair(
        session,
        &cipher,
        &targets,
        config.seed.default_password(),
        dry_run,
    )
    .await;
    pool.close().await;
    let report = report?;

    if json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report.render_text());
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_verify(json: bool) -> OpsResult<ExitCode> {
    let config = OpsConfig::from_env()?;
    let cipher = config.cipher.build()?;
    let targets = default_targets();

    let pool = pronto_db::connect(&config.database).await?;
    let mut session = EmployeeSession::begin(&pool).await?;
    let report = verify::run_verify(
        &mut session,
        &cipher,
        &targets,
        config.seed.default_password(),
    )
    .await;
    // Reads only; dropping the session rolls it back.
    drop(session);
    pool.close().await;
    let report = report?;

    if json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report.render_text());
    }
    Ok(ExitCode::from(report.exit_code()))
}
