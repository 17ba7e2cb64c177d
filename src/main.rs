use chain_prompt::cli::Cli;
use chain_prompt::commands;
use chain_prompt::core::config::load_config;
use chain_prompt::core::logging::init_logging;
use chain_prompt::core::storage::AppCtx;
use clap::Parser;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("• {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let ctx = AppCtx::init()?;
    let config = load_config(&ctx.config_path)?;
    init_logging(&config.logging);

    commands::dispatch(cli.command, &ctx, &config).await
}
