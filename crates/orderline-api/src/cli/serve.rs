//! `orderline serve` -- run the HTTP server and the WhatsApp session.

use std::path::Path;

use anyhow::Result;
use console::style;
use secrecy::SecretString;

use orderline_infra::config::load_app_config;
use orderline_infra::filesystem::config_path;
use orderline_types::config::AppConfig;

use super::ServeArgs;
use crate::http;
use crate::state::AppState;

/// Layer flags and environment variables over the file config.
pub fn apply_overrides(config: &mut AppConfig, args: &ServeArgs) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(origin) = &args.allowed_origin {
        config.server.allowed_origin = Some(origin.clone());
    }
    if let Some(web_dir) = &args.web_dir {
        config.server.web_dir = web_dir.clone();
    }
    if let Some(url) = &args.bridge_url {
        config.bridge.api_url = url.clone();
    }
    if let Some(key) = &args.bridge_api_key {
        config.bridge.api_key = SecretString::from(key.clone());
    }
}

pub async fn serve(args: ServeArgs, data_dir: &Path) -> Result<()> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| config_path(data_dir));
    let mut config = load_app_config(&path).await;
    apply_overrides(&mut config, &args);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::init(config, data_dir).await?;
    state.start();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server listening");

    println!(
        "  {} Orderline listening on {}",
        style("🍕").bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state.clone());

    axum::serve(listener, router)
        .with_graceful_shutdown(crate::shutdown_signal())
        .await?;

    state.shutdown();
    println!("\n  Server stopped.");
    Ok(())
}
