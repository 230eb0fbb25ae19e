//! Order message formatter.
//!
//! Pure transformation from a validated [`Order`] to the chat message body.
//! The submission time is passed in so output is deterministic.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use orderline_types::config::OrderFormatConfig;
use orderline_types::order::Order;

/// strftime pattern for the `Time:` line.
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %I:%M:%S %p";

/// Renders orders as human-readable chat messages.
#[derive(Debug, Clone)]
pub struct OrderFormatter {
    currency: String,
    title: String,
}

impl OrderFormatter {
    pub fn new(config: &OrderFormatConfig) -> Self {
        Self {
            currency: config.currency_symbol.clone(),
            title: config.title.clone(),
        }
    }

    /// Build the message body.
    ///
    /// ```text
    /// 🍕 *New Pizza Order*
    ///
    /// Customer: Ravi
    /// Phone: 919876543210
    ///
    /// 1. Margherita  x2 - ₹150
    ///
    /// Total: ₹300
    /// Notes: less spicy
    /// Time: 16/10/2026, 07:30:00 PM
    /// ```
    pub fn format<Tz>(&self, order: &Order, submitted_at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut lines = vec![self.title.clone(), String::new()];

        if let Some(name) = &order.customer_name {
            lines.push(format!("Customer: {name}"));
        }
        lines.push(format!("Phone: {}", order.phone));
        lines.push(String::new());

        for (i, item) in order.items.iter().enumerate() {
            let mut line = format!("{}. {}  x{}", i + 1, item.name, item.qty);
            if let Some(price) = item.price {
                line.push_str(&format!(" - {}{}", self.currency, format_amount(price)));
            }
            lines.push(line);
        }

        lines.push(String::new());
        lines.push(format!(
            "Total: {}{}",
            self.currency,
            format_amount(order.effective_total())
        ));
        if let Some(notes) = &order.notes {
            // Continuation lines are indented so none reads as an item line.
            lines.push(format!("Notes: {}", notes.replace('\n', "\n  ")));
        }
        lines.push(format!("Time: {}", submitted_at.format(TIMESTAMP_FORMAT)));

        lines.join("\n")
    }
}

impl Default for OrderFormatter {
    fn default() -> Self {
        Self::new(&OrderFormatConfig::default())
    }
}

/// Whole amounts print without decimals, everything else with two.
pub fn format_amount(amount: f64) -> String {
    // Past 1e15 an f64 has no cents left to round.
    let rounded = if amount.abs() >= 1e15 {
        amount
    } else {
        (amount * 100.0).round() / 100.0
    };
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.2}")
    }
}
