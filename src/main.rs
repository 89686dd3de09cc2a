use anyhow::Result;
use clap::Parser;

use sheet_console::commands::{self, AppState, Cli};
use sheet_console::{config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let cli = Cli::parse();

    let mut config = config::Config::new()?;
    if let Some(url) = cli.api_url {
        let url = url.trim_end_matches('/').to_string();
        config.auth_base_url = url.clone();
        config.api_base_url = url;
    }
    tracing::debug!("Using backend at {}", config.api_base_url);

    let mut state = AppState::new(config).await?;
    commands::run(&mut state, cli.command).await?;

    Ok(())
}
