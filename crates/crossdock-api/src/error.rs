//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from the billing crates to HTTP status codes and a
//! consistent JSON error body. Internal error details are never exposed in
//! responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use crossdock_billing::{AccrualError, ChargeError, PricingError};
use crossdock_core::{MoneyError, ValidationError};
use crossdock_rates::{QuoteError, RateError, ZoneError};
use crossdock_warehouse::WarehouseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422). Both JSON deserialization failures
    /// and business-rule violations map here — only malformed HTTP framing
    /// is 400, and axum produces that before a handler runs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflict with current resource state (409): full bins, duplicate
    /// accrual periods, overlapping effective dates, and the like.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to
    /// the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// Service dependency not available (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<MoneyError> for AppError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ZoneError> for AppError {
    fn from(err: ZoneError) -> Self {
        match &err {
            ZoneError::ZoneNotFound(_) | ZoneError::UnknownZone(_) => {
                Self::NotFound(err.to_string())
            }
            ZoneError::CountryAlreadyZoned { .. } | ZoneError::DuplicateZoneName(_) => {
                Self::Conflict(err.to_string())
            }
            ZoneError::EmptyZoneName => Self::Validation(err.to_string()),
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match &err {
            RateError::RateNotFound { .. } | RateError::NoRatesForZone { .. } => {
                Self::NotFound(err.to_string())
            }
            RateError::WeightExceedsRateLimit { .. } => Self::Validation(err.to_string()),
            RateError::OverlappingPeriod { .. } => Self::Conflict(err.to_string()),
            // Two rate rows matched one reference date: corrupt data, not a
            // client problem.
            RateError::AmbiguousRates { .. } => Self::Internal(err.to_string()),
            RateError::Invalid(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::Zone(e) => e.into(),
            QuoteError::Rate(e) => e.into(),
        }
    }
}

impl From<WarehouseError> for AppError {
    fn from(err: WarehouseError) -> Self {
        match &err {
            WarehouseError::UnknownPackage(_) | WarehouseError::UnknownBin(_) => {
                Self::NotFound(err.to_string())
            }
            WarehouseError::BinInactive(_)
            | WarehouseError::BinFull { .. }
            | WarehouseError::BinWeightExceeded { .. }
            | WarehouseError::AlreadyAssigned { .. }
            | WarehouseError::NoActiveAssignment(_)
            | WarehouseError::DuplicateBinCode { .. }
            | WarehouseError::TerminalStatus { .. }
            | WarehouseError::RemovalPredatesAssignment(_)
            | WarehouseError::AssignmentPredatesHistory(_) => Self::Conflict(err.to_string()),
            WarehouseError::EmptyBinCode
            | WarehouseError::ZeroCapacity
            | WarehouseError::EmptyTrackingNumber
            | WarehouseError::WarehouseMismatch { .. }
            | WarehouseError::Invalid(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match &err {
            // A coverage gap is an operator configuration problem surfaced
            // to the caller as a conflict, never silent free storage.
            PricingError::NoPricingForDate { .. } | PricingError::OverlappingPricing { .. } => {
                Self::Conflict(err.to_string())
            }
            PricingError::UnknownPricing(_) => Self::NotFound(err.to_string()),
            PricingError::Invalid(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<ChargeError> for AppError {
    fn from(err: ChargeError) -> Self {
        match &err {
            ChargeError::DuplicatePeriod { .. } => Self::Conflict(err.to_string()),
            ChargeError::UnknownCharge(_) => Self::NotFound(err.to_string()),
        }
    }
}

impl From<AccrualError> for AppError {
    fn from(err: AccrualError) -> Self {
        match err {
            AccrualError::Warehouse(e) => e.into(),
            AccrualError::NotInStorage(_) => Self::Conflict(err.to_string()),
            AccrualError::Pricing(e) => e.into(),
            AccrualError::Charge(e) => e.into(),
        }
    }
}
