//! Orderline CLI and HTTP server entry point.
//!
//! Binary name: `orderline`
//!
//! Parses CLI arguments, sets up tracing, then dispatches to the command
//! handler or starts the order server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use orderline_infra::config::load_app_config;
use orderline_infra::filesystem::{config_path, resolve_data_dir};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info,tower_http=warn",
        1 => "info,orderline_api=debug,orderline_core=debug,orderline_infra=debug,tower_http=debug",
        _ => "trace",
    };
    orderline_observe::init_tracing(cli.log_format, cli.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    orderline_observe::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "orderline", &mut std::io::stdout());
        }

        Commands::Serve(args) => {
            cli::serve::serve(args, &resolve_data_dir()).await?;
        }

        Commands::Status { url, json } => {
            cli::status::status(&url, json).await?;
        }

        Commands::Preview { file } => {
            let config = load_app_config(&config_path(&resolve_data_dir())).await;
            cli::preview::preview(&file, &config).await?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
