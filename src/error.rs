//! Marketplace error types with HTTP status code mapping.
//!
//! [`MarketError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Storage-level conflicts (duplicate claim or rating keys) surface here as
//! typed domain errors, never as raw store failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "message": "deal already claimed by this user",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                |
/// |-----------|-------------------|----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request            |
/// | 2000–2099 | Not Found         | 404 Not Found              |
/// | 2100–2199 | Conflict          | 409 Conflict               |
/// | 3000–3999 | Server            | 500 Internal Server Error  |
/// | 4000–4999 | Auth              | 401 / 403                  |
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Rating value outside the allowed `[1, 5]` range.
    #[error("invalid rating {0}: must be between 1 and 5")]
    InvalidRating(u8),

    /// Subscription radius outside the allowed `(0, 50000]` range.
    #[error("invalid radius {0}: must be positive and at most 50000 meters")]
    InvalidRadius(f64),

    /// Deal expiry timestamp is not in the future.
    #[error("invalid expiry: deal must expire in the future")]
    InvalidExpiry,

    /// Deal with the given ID was not found.
    #[error("deal not found: {0}")]
    DealNotFound(uuid::Uuid),

    /// Vendor record for the deal's owner was not found.
    #[error("vendor not found: {0}")]
    VendorNotFound(uuid::Uuid),

    /// No claim exists for the given deal and user.
    #[error("no claim found for deal {0}")]
    NoSuchClaim(uuid::Uuid),

    /// The user already holds a claim on this deal.
    #[error("deal {0} already claimed by this user")]
    AlreadyClaimed(uuid::Uuid),

    /// The user already rated this deal.
    #[error("deal {0} already rated by this user")]
    AlreadyRated(uuid::Uuid),

    /// Request carried no usable principal identity.
    #[error("unauthenticated: missing or malformed principal")]
    Unauthenticated,

    /// Principal role does not permit the operation.
    #[error("forbidden: requires {0} role")]
    Forbidden(&'static str),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidRating(_) => 1002,
            Self::InvalidRadius(_) => 1003,
            Self::InvalidExpiry => 1004,
            Self::DealNotFound(_) => 2001,
            Self::VendorNotFound(_) => 2002,
            Self::NoSuchClaim(_) => 2003,
            Self::AlreadyClaimed(_) => 2101,
            Self::AlreadyRated(_) => 2102,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
            Self::Unauthenticated => 4001,
            Self::Forbidden(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidRating(_)
            | Self::InvalidRadius(_)
            | Self::InvalidExpiry => StatusCode::BAD_REQUEST,
            Self::DealNotFound(_) | Self::VendorNotFound(_) | Self::NoSuchClaim(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyClaimed(_) | Self::AlreadyRated(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
