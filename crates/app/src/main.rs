use std::io;

use clap::Parser;
use lingo_core::model::AdminSecret;
use services::{AppServices, Clock};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;

use cli::Cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let db_url = config::normalize_sqlite_url(&cli.db);
    config::prepare_sqlite_file(&db_url)?;
    tracing::debug!(%db_url, "opening database");
    let services =
        AppServices::new_sqlite(&db_url, Clock::system(), AdminSecret::new(cli.admin_secret))
            .await?;

    let stdin = io::stdin();
    let result = commands::dispatch(
        &services,
        cli.command,
        &mut stdin.lock(),
        &mut io::stdout().lock(),
    )
    .await;
    services.shutdown().await;
    result
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}
