//! `orderline status` -- ask a running server for its session status.

use anyhow::{Context, Result};
use console::style;

use orderline_types::session::SessionStatus;

/// Fetch `/api/status` from `base_url` and print it.
pub async fn status(base_url: &str, json: bool) -> Result<()> {
    let url = format!("{}/api/status", base_url.trim_end_matches('/'));
    let status: SessionStatus = reqwest::get(&url)
        .await
        .with_context(|| format!("could not reach {url}"))?
        .error_for_status()?
        .json()
        .await
        .context("unexpected status response")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Orderline v{}",
        style("🍕").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  {}", style("── WhatsApp ──").dim());
    if status.ready {
        println!("  Session:  {}", style("ready").green().bold());
    } else {
        println!("  Session:  {}", style("not ready").yellow().bold());
        println!(
            "  {}",
            style("Open the server's page and scan the QR code with WhatsApp.").dim()
        );
    }

    if let Some(info) = status.info {
        if let Some(wid) = info.wid {
            println!("  Account:  {}", style(wid).cyan());
        }
        if let Some(name) = info.pushname {
            println!("  Name:     {name}");
        }
        if let Some(platform) = info.platform {
            println!("  Platform: {}", style(platform).dim());
        }
    }
    println!();

    Ok(())
}
