//! Order submission handler.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

use crate::http::error::AppError;
use crate::http::response::OrderAccepted;
use crate::state::AppState;

/// POST /api/order - forward an order to the customer's WhatsApp.
///
/// Takes the raw body so readiness is checked before the JSON is parsed.
pub async fn submit_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OrderAccepted>, AppError> {
    let id = state.orders.submit(&body).await?;
    Ok(Json(OrderAccepted::new(id)))
}
