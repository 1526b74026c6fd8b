//! Error types for the pricing service
//!
//! Validation and currency errors are raised where they are detected and
//! travel unchanged to the HTTP boundary. Catalog and rate provider errors
//! carry the source or currency involved together with the underlying cause.

use serde::Serialize;
use thiserror::Error;

/// Top-level pricing error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Malformed client input
    #[error("{message}")]
    Validation { message: String },

    /// Currency code not offered by the rate provider
    #[error("Invalid currency: {code}")]
    InvalidCurrency { code: String },

    /// Catalog source unreadable or malformed
    #[error("Unable to load the data from {source_id}: {cause}")]
    CatalogLoad { source_id: String, cause: String },

    /// Upstream currency service failure
    #[error("{context}: {cause}")]
    RateProvider { context: String, cause: String },

    /// Unknown product or VAT band on direct lookup
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl PricingError {
    pub fn validation(message: impl Into<String>) -> Self {
        PricingError::Validation {
            message: message.into(),
        }
    }

    pub fn catalog_load(source_id: impl Into<String>, cause: impl ToString) -> Self {
        PricingError::CatalogLoad {
            source_id: source_id.into(),
            cause: cause.to_string(),
        }
    }

    pub fn rate_provider(context: impl Into<String>, cause: impl ToString) -> Self {
        PricingError::RateProvider {
            context: context.into(),
            cause: cause.to_string(),
        }
    }

    /// HTTP status equivalent
    pub fn status_code(&self) -> u16 {
        match self {
            PricingError::Validation { .. } | PricingError::InvalidCurrency { .. } => 400,
            PricingError::NotFound { .. } => 404,
            PricingError::CatalogLoad { .. } | PricingError::RateProvider { .. } => 500,
        }
    }

    /// Stable machine readable tag
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::Validation { .. } => "VALIDATION_ERROR",
            PricingError::InvalidCurrency { .. } => "INVALID_CURRENCY",
            PricingError::CatalogLoad { .. } => "CATALOG_LOAD_ERROR",
            PricingError::RateProvider { .. } => "RATE_PROVIDER_ERROR",
            PricingError::NotFound { .. } => "NOT_FOUND",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.kind(),
            code: self.status_code(),
            message: self.to_string(),
        }
    }
}

/// Wire form of an error: `{"error": ..., "code": ..., "message": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: &'static str,
    pub code: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = PricingError::validation("Missing order key");
        assert_eq!(err.to_string(), "Missing order key");
        assert_eq!(err.status_code(), 400);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_catalog_load_error_carries_source() {
        let err = PricingError::catalog_load("/srv/pricing.json", "missing field `prices`");
        assert_eq!(
            err.to_string(),
            "Unable to load the data from /srv/pricing.json: missing field `prices`"
        );
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_not_found_is_404() {
        let err = PricingError::NotFound {
            entity: "product_id",
            id: "999".to_string(),
        };
        assert_eq!(err.to_string(), "product_id not found: 999");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_payload() {
        let payload = PricingError::InvalidCurrency {
            code: "XXX".to_string(),
        }
        .payload();
        assert_eq!(payload.error, "INVALID_CURRENCY");
        assert_eq!(payload.code, 400);
        assert_eq!(payload.message, "Invalid currency: XXX");
    }
}
