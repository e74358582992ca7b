// gaffer entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (stderr; stdout carries results)
// 3. Load config, copying defaults/ on first run
// 4. Run the subcommand

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use gaffer_cli::args::Cli;
use gaffer_cli::run::run;
use gaffer_core::config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing()?;

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        base_url = %config.api.base_url,
        budget = config.squad.budget,
        "Config loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&cli, &config, &mut out).await?;
    out.flush()?;
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gaffer=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
