use thiserror::Error;

/// Errors from validating an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Errors from the messaging session or its backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagingError {
    #[error("messaging session is not ready")]
    NotReady,

    /// The backend rejected the message or failed to deliver it.
    #[error("{0}")]
    Delivery(String),

    /// The backend could not be reached or returned something unusable
    /// outside of a send.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Outcome of `OrderService::submit` when it does not send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("messaging session is not ready")]
    NotReady,

    #[error(transparent)]
    Invalid(#[from] OrderError),

    #[error("{0}")]
    Delivery(String),
}

impl From<MessagingError> for SubmitError {
    fn from(e: MessagingError) -> Self {
        match e {
            MessagingError::NotReady => SubmitError::NotReady,
            MessagingError::Delivery(reason) | MessagingError::Backend(reason) => {
                SubmitError::Delivery(reason)
            }
        }
    }
}

/// Errors from rendering a QR challenge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    #[error("qr encode error: {0}")]
    Encode(String),
}

/// Errors from loading configuration or local session records.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_error_displays_backend_reason_verbatim() {
        let err = MessagingError::Delivery("number not on WhatsApp".to_string());
        assert_eq!(err.to_string(), "number not on WhatsApp");
    }

    #[test]
    fn messaging_errors_map_into_submit_errors() {
        assert_eq!(
            SubmitError::from(MessagingError::NotReady),
            SubmitError::NotReady
        );
        assert_eq!(
            SubmitError::from(MessagingError::Backend("timeout".to_string())),
            SubmitError::Delivery("timeout".to_string())
        );
    }

    #[test]
    fn order_error_display() {
        let err = OrderError::InvalidPayload("phone is required".to_string());
        assert_eq!(err.to_string(), "invalid payload: phone is required");
    }
}
