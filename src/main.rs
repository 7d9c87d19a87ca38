// src/main.rs — Scribe entry point

use clap::Parser;

use scribe::cli::{Cli, Commands};
use scribe::infra::config::Config;
use scribe::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (respects RUST_LOG)
    logger::init_logging(logger::level_for(cli.verbose));

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        None | Some(Commands::Launch) => {
            scribe::cli::launcher::run_launcher(&config, cli.config.as_deref(), cli.verbose).await
        }
        Some(Commands::Chat { model, resume }) => {
            scribe::cli::chat::run_chat_host(&config, &model, resume.as_deref()).await
        }
        Some(Commands::Models) => scribe::cli::list::run_models(&config).await,
        Some(Commands::Sessions) => scribe::cli::list::run_sessions(&config),
    }
}
