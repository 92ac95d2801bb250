mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Global};
use crate::commands::Context;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use filestation_client::api::{DryRunApi, HttpApi};
use filestation_client::ApiHandle;
use filestation_config::Config;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("error: {}", *err);
            ExitCode::from(err.exit_code())
        },
    }
}

/// `RUST_LOG` wins; otherwise `-v` steps up from warnings.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.global.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(server) = &cli.global.server {
        config.server.url = server.clone();
    }
    let api = connect(&config, &cli.global).await?;
    let ctx = Context::new(api, config)?;
    commands::run(&ctx, cli.command).await
}

async fn connect(config: &Config, global: &Global) -> Result<ApiHandle> {
    let http = HttpApi::new(&config.server.url).or_raise(|| ErrorKind::Config)?;
    let mut api: ApiHandle = Arc::new(http);
    if global.dry_run {
        tracing::info!("Dry run: nothing will be changed on the server");
        api = Arc::new(DryRunApi::new(api));
    }
    if let (Some(user), Some(password)) = (&global.user, &global.password) {
        api.login(user, password).await.map_err(ErrorKind::client)?;
        tracing::info!(user = %user, "Logged in");
    }
    Ok(api)
}
