//! `orderline preview` -- validate an order file and show the message.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use console::style;

use orderline_core::order::OrderFormatter;
use orderline_core::order::validate::parse_order;
use orderline_types::config::AppConfig;

/// Print the WhatsApp message `file` would produce, without sending it.
pub async fn preview(file: &Path, config: &AppConfig) -> Result<()> {
    let body = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let order = match parse_order(&body) {
        Ok(order) => order,
        Err(err) => {
            eprintln!("  {} {err}", style("✗").red());
            anyhow::bail!("order rejected");
        }
    };

    let formatter = OrderFormatter::new(&config.order);
    let message = formatter.format(&order, &Local::now());

    println!();
    println!(
        "  {} To: {}",
        style("✓").green(),
        style(&order.phone).cyan()
    );
    println!();
    for line in message.lines() {
        println!("  {line}");
    }
    println!();

    Ok(())
}
