//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Storage failures, tagged with the step that failed
    #[error("Ledger write failed: {0}")]
    LedgerWrite(#[source] StoreError),

    #[error("Balance update failed: {0}")]
    BalanceUpdate(#[source] StoreError),

    #[error("Inventory write failed: {0}")]
    InventoryWrite(#[source] StoreError),

    #[error("Registration failed: {0}")]
    Registration(#[source] StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Token generation failed: {0}")]
    TokenGeneration(#[source] jsonwebtoken::errors::Error),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::MissingToken => "missing_token",
            AppError::InvalidToken => "invalid_token",
            AppError::Domain(domain_err) => match domain_err {
                DomainError::InvalidInput(_) => "invalid_input",
                DomainError::SenderNotFound(_) => "sender_not_found",
                DomainError::RecipientNotFound(_) => "recipient_not_found",
                DomainError::UserNotFound(_) => "user_not_found",
                DomainError::ItemNotFound(_) => "item_not_found",
                DomainError::InsufficientFunds { .. } => "insufficient_funds",
                DomainError::InvalidCredentials => "invalid_credentials",
                DomainError::SelfTransfer => "self_transfer",
                DomainError::ZeroAmount => "zero_amount",
            },
            AppError::LedgerWrite(_) => "ledger_write_error",
            AppError::BalanceUpdate(_) => "balance_update_error",
            AppError::InventoryWrite(_) => "inventory_write_error",
            AppError::Registration(_) => "registration_error",
            AppError::Storage(_) => "storage_error",
            AppError::TokenGeneration(_) => "token_generation_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Status used when an endpoint does not pin one
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Domain(domain_err) => match domain_err {
                DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                e if e.is_not_found() => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::Registration(_) | AppError::TokenGeneration(_) => StatusCode::UNAUTHORIZED,
            AppError::LedgerWrite(_)
            | AppError::BalanceUpdate(_)
            | AppError::InventoryWrite(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error came from the storage layer
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            AppError::LedgerWrite(_)
                | AppError::BalanceUpdate(_)
                | AppError::InventoryWrite(_)
                | AppError::Registration(_)
                | AppError::Storage(_)
        )
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An `AppError` answered with an endpoint-specific status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: AppError,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<AppError>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn bad_request(error: impl Into<AppError>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized(error: impl Into<AppError>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }

    pub fn not_found(error: impl Into<AppError>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            status: error.status_code(),
            error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError { status, error } = self;

        if error.is_storage_error() {
            tracing::error!(error = ?error, "Storage failure");
        } else if matches!(error, AppError::Internal(_)) {
            tracing::error!(error = %error, "Internal failure");
        }

        let details = match &error {
            AppError::InvalidRequest(msg) => Some(msg.clone()),
            AppError::Domain(domain_err) => Some(domain_err.to_string()),
            _ => None,
        };

        let body = ErrorResponse {
            error: error.to_string(),
            error_code: error.error_code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coins;

    #[test]
    fn test_default_status_mapping() {
        assert_eq!(AppError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Domain(DomainError::UserNotFound("bob".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Domain(DomainError::insufficient_funds(
                Coins::new(10).unwrap(),
                Coins::zero()
            ))
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BalanceUpdate(StoreError::Injected("debit_balance")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_pins_status() {
        let err = ApiError::bad_request(AppError::LedgerWrite(StoreError::Injected("x")));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.error_code(), "ledger_write_error");
    }

    #[test]
    fn test_domain_error_codes() {
        let err: AppError = DomainError::InvalidCredentials.into();
        assert_eq!(err.error_code(), "invalid_credentials");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
