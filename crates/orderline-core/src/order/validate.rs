//! Turning a raw order submission into a validated [`Order`].

use orderline_types::error::OrderError;
use orderline_types::order::{DEFAULT_ITEM_NAME, Order, OrderItem, OrderItemRequest, OrderRequest};

use super::phone::validate_phone;

/// Largest accepted price or total.
pub const MAX_AMOUNT: f64 = 1e12;

/// Parse a JSON request body and validate it.
///
/// Malformed JSON and wrongly typed fields are reported as
/// [`OrderError::InvalidPayload`], same as missing fields.
pub fn parse_order(body: &[u8]) -> Result<Order, OrderError> {
    let request: OrderRequest = serde_json::from_slice(body)
        .map_err(|e| OrderError::InvalidPayload(format!("malformed order body: {e}")))?;
    validate_order(request)
}

/// Validate a deserialized request.
pub fn validate_order(request: OrderRequest) -> Result<Order, OrderError> {
    let raw_phone = request
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| OrderError::InvalidPayload("phone is required".to_string()))?;

    let raw_items = match request.items {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(OrderError::InvalidPayload(
                "items must be a non-empty array".to_string(),
            ));
        }
    };

    let phone = validate_phone(raw_phone)?;

    let items = raw_items
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_item(i + 1, item))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(total) = request.total {
        if !valid_amount(total) {
            return Err(OrderError::InvalidPayload(format!(
                "total must be a non-negative number up to {MAX_AMOUNT}"
            )));
        }
    }

    Ok(Order {
        phone,
        customer_name: non_blank(request.name).map(|n| single_line(&n)),
        items,
        total: request.total,
        notes: request.notes.filter(|n| !n.trim().is_empty()),
    })
}

fn validate_item(position: usize, item: OrderItemRequest) -> Result<OrderItem, OrderError> {
    let qty = match item.qty {
        None => 1,
        Some(q) if q.is_finite() && q >= 1.0 && q.fract() == 0.0 && q <= f64::from(u32::MAX) => {
            q as u32
        }
        Some(q) => {
            return Err(OrderError::InvalidPayload(format!(
                "item {position}: qty must be a whole number >= 1, got {q}"
            )));
        }
    };

    if let Some(price) = item.price {
        if !valid_amount(price) {
            return Err(OrderError::InvalidPayload(format!(
                "item {position}: price must be a non-negative number up to {MAX_AMOUNT}"
            )));
        }
    }

    let name = non_blank(item.name)
        .map(|n| single_line(&n))
        .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());

    Ok(OrderItem {
        name,
        qty,
        price: item.price,
    })
}

fn valid_amount(amount: f64) -> bool {
    amount.is_finite() && (0.0..=MAX_AMOUNT).contains(&amount)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Collapse line breaks so a value never spans more than one message line.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
