//! Order domain types.
//!
//! `OrderRequest` is the lenient wire shape accepted by `POST /api/order`:
//! every field is optional so that missing fields surface as validation
//! errors rather than extractor rejections. `Order` is the validated form
//! consumed by the formatter. Neither is persisted.

use serde::{Deserialize, Serialize};

/// Placeholder used when an item arrives without a name.
pub const DEFAULT_ITEM_NAME: &str = "Item";

/// Raw order submission as received over HTTP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Customer phone number in any human format ("+91 98765-43210").
    #[serde(default)]
    pub phone: Option<String>,
    /// Customer display name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<OrderItemRequest>>,
    /// Explicit order total. Computed from the items when absent.
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Raw line item as received over HTTP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Quantity; must be a whole number >= 1 when present.
    #[serde(default)]
    pub qty: Option<f64>,
    /// Unit price; must be finite and >= 0 when present.
    #[serde(default)]
    pub price: Option<f64>,
}

/// A validated order, ready to be formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    /// Digits-only phone number.
    pub phone: String,
    pub customer_name: Option<String>,
    /// Never empty.
    pub items: Vec<OrderItem>,
    pub total: Option<f64>,
    /// Present only when non-blank.
    pub notes: Option<String>,
}

/// A validated line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub name: String,
    pub qty: u32,
    pub price: Option<f64>,
}

impl OrderItem {
    /// Line amount, treating a missing price as zero.
    pub fn line_total(&self) -> f64 {
        self.price.unwrap_or(0.0) * f64::from(self.qty)
    }
}

impl Order {
    /// Sum of `price * qty` over all items.
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// The explicit total if one was supplied, otherwise the computed one.
    pub fn effective_total(&self) -> f64 {
        self.total.unwrap_or_else(|| self.computed_total())
    }
}

/// A formatted chat message addressed to a backend recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Backend-specific recipient identifier (e.g. `919876543210@c.us`).
    pub recipient: String,
    pub body: String,
}
