//! trellis - Main entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trellis::{
    Result,
    cli::{Cli, Command, ProxyCommand},
    config::{ConfigStore, Layout},
    output,
    proxy::{ProxyLifecycle, ProxyStack},
    setup::{Setup, StdinConfirm},
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let layout = Layout::discover()?;
    let config = Arc::new(ConfigStore::new(layout));
    let stack = ProxyStack::with_docker(Arc::clone(&config));
    let confirm = StdinConfirm;
    let setup = Setup::new(Arc::clone(&config), &stack, &confirm);

    match cli.command {
        Command::Init => setup.initialize().await,
        Command::Proxy(command) => {
            // Every proxy command needs an intact install first.
            setup.ensure()?;
            match command {
                ProxyCommand::Start => stack.start().await,
                ProxyCommand::Stop => stack.stop().await,
                ProxyCommand::Restart => stack.restart().await,
            }
        }
    }
}
