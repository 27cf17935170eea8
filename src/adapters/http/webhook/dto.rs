//! Response DTOs for the webhook endpoint.

use serde::{Deserialize, Serialize};

/// Error body returned for rejected deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_serializes_with_snake_case_fields() {
        let json = serde_json::to_value(ErrorResponse::new("BAD_SIGNATURE", "Bad signature")).unwrap();
        assert_eq!(json["error_code"], "BAD_SIGNATURE");
        assert_eq!(json["message"], "Bad signature");
    }
}
