use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saasprobe_cli::feedback::EXIT_FAILURE;
use saasprobe_cli::{commands, App, Cli};
use saasprobe_client::ClientConfig;

const DEFAULT_LOG_FILTER: &str = "saasprobe_cli=warn,saasprobe_client=warn";
const VERBOSE_LOG_FILTER: &str = "saasprobe_cli=debug,saasprobe_client=debug";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // --- Tracing ---
    let default_filter = if cli.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let mut app = match startup(cli.api_url.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), format!("{e:#}").red());
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match commands::run(&mut app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => e.report(),
    }
}

fn startup(api_url: Option<&str>) -> anyhow::Result<App> {
    let mut config = ClientConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = api_url {
        config = config.with_api_url(url).context("Invalid --api-url")?;
    }
    tracing::debug!(
        api_url = %config.api_url,
        token_path = %config.token_path.display(),
        "Loaded client configuration"
    );
    App::from_config(config).context("Failed to initialise the client")
}
