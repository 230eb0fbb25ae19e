//! Phone number normalization.

use orderline_types::error::OrderError;

/// Shortest digit string accepted as a phone number.
pub const MIN_PHONE_DIGITS: usize = 7;
/// Longest digit string accepted (E.164 maximum).
pub const MAX_PHONE_DIGITS: usize = 15;

/// Strip every non-digit character.
///
/// `"+91 98765-43210"` becomes `"919876543210"`.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize and check that the result has a plausible length.
pub fn validate_phone(raw: &str) -> Result<String, OrderError> {
    let digits = normalize_phone(raw);
    if digits.is_empty() {
        return Err(OrderError::InvalidPayload(
            "phone must contain digits".to_string(),
        ));
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(OrderError::InvalidPayload(format!(
            "phone must have {MIN_PHONE_DIGITS}-{MAX_PHONE_DIGITS} digits, got {}",
            digits.len()
        )));
    }
    Ok(digits)
}
