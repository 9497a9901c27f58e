//! # API Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Warung POS                             │
//! │                                                                         │
//! │  checkout_cash(...)                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Request::new(...) ── CoreError (empty cart, short cash) ──► ApiError  │
//! │         │             nothing written                                   │
//! │         ▼                                                               │
//! │  step 1 ─► step 2 ─► step 3 ─► step 4                                   │
//! │                         │                                               │
//! │                         ✗ DbError::QueryFailed("...")                   │
//! │                         │                                               │
//! │                         ▼                                               │
//! │  ApiError { code: PARTIAL_WRITE, step: post_cash_entry,                 │
//! │             orderId, message: store text kept verbatim }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store messages are never replaced by a generic text: the shop operator
//! reconciles by hand and needs the original wording.

use serde::Serialize;
use warung_core::{short_id, CoreError, ValidationError, WriteStep};
use warung_db::DbError;

/// API error returned from console commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PARTIAL_WRITE",
///   "message": "decrement stock failed after create order, create order lines, post cash entry: ...",
///   "step": "decrement_stock",
///   "orderId": "1a2b3c4d-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Write step that failed, for multi-step sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<WriteStep>,

    /// Order the failed sequence was working on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed, nothing was written
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule refused the operation (e.g. completing a cancelled order)
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Insufficient stock
    InsufficientStock,

    /// Payment problem (tendered cash below total)
    PaymentError,

    /// A sequence stopped midway; earlier writes remain committed
    PartialWrite,

    /// Session is no longer valid
    SessionExpired,

    /// Local file or configuration problem
    Storage,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            step: None,
            order_id: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a local storage error (cart file, config file).
    pub fn storage(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Storage, message)
    }

    /// Wraps the failure of `step` inside a write sequence.
    ///
    /// `completed` lists the steps that already committed. With none, the
    /// cause's code is kept (nothing to reconcile); otherwise the code is
    /// `PartialWrite` and the message names what was saved.
    pub fn failed_at(
        step: WriteStep,
        completed: &[WriteStep],
        order_id: Option<&str>,
        cause: impl Into<ApiError>,
    ) -> Self {
        let cause = cause.into();

        let (code, message) = if completed.is_empty() {
            (cause.code, format!("{} failed: {}", step, cause.message))
        } else {
            let saved = completed
                .iter()
                .map(WriteStep::label)
                .collect::<Vec<_>>()
                .join(", ");
            let target = order_id
                .map(|id| format!(" Verify order #{} by hand.", short_id(id)))
                .unwrap_or_default();
            (
                ErrorCode::PartialWrite,
                format!(
                    "{} failed after {}: {}.{}",
                    step, saved, cause.message, target
                ),
            )
        };

        ApiError {
            code,
            message,
            step: Some(step),
            order_id: order_id.map(str::to_string),
        }
    }

    /// True when earlier writes of the failed sequence were kept.
    pub fn is_partial(&self) -> bool {
        self.code == ErrorCode::PartialWrite
    }
}

/// Converts database errors to API errors, keeping the store text.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { entity, id } => ApiError::not_found(entity, id),
            DbError::Conflict { .. } => ApiError::new(ErrorCode::BusinessLogic, err.to_string()),
            DbError::UniqueViolation { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, err.to_string())
            }
            _ => {
                tracing::error!(error = %err, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, err.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::TabNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::EmptyCart => ErrorCode::CartError,
            CoreError::InsufficientCash { .. } => ErrorCode::PaymentError,
            CoreError::InvalidOrderStatus { .. } | CoreError::InvalidTabStatus { .. } => {
                ErrorCode::BusinessLogic
            }
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Session Expiry
// =============================================================================

/// What the client should do with its session after a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    /// Not an auth failure; show the error as usual.
    Keep,
    /// Sign out, then send the operator to the login entry point.
    SignOutAndLogin,
    /// Sign out, then reload the public page.
    SignOutAndReload,
}

/// Path prefix of the protected admin area.
pub const ADMIN_PATH_PREFIX: &str = "/admin";

/// Entry point admins are sent to when their session expires.
pub const LOGIN_PATH: &str = "/login";

/// Classifies a failure response for session expiry.
///
/// A failure is an auth failure when its message mentions `jwt` (any case)
/// or its code/status is 401. Admin pages go back to login, public pages
/// just reload.
pub fn classify_session_failure(
    message: &str,
    status: Option<u16>,
    code: Option<&str>,
    path: &str,
) -> SessionAction {
    let is_auth = message.to_lowercase().contains("jwt")
        || status == Some(401)
        || code == Some("401");

    if !is_auth {
        return SessionAction::Keep;
    }

    tracing::warn!(path, "Session expired, signing out");
    if path.starts_with(ADMIN_PATH_PREFIX) {
        SessionAction::SignOutAndLogin
    } else {
        SessionAction::SignOutAndReload
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warung_core::ValidationError;

    #[test]
    fn test_store_message_kept_verbatim() {
        let err: ApiError = DbError::QueryFailed("stock locked by trigger".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("stock locked by trigger"));
    }

    #[test]
    fn test_conflict_is_business_logic() {
        let err: ApiError = DbError::conflict("Order", "abc", "already completed").into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.message.contains("already completed"));
    }

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: ApiError = CoreError::InsufficientCash {
            total: 20000,
            tendered: 15000,
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentError);

        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "debtor name".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("debtor name is required"));
    }

    #[test]
    fn test_failed_at_first_step_keeps_cause_code() {
        let err = ApiError::failed_at(
            WriteStep::CreateOrder,
            &[],
            Some("abcdef12-0000"),
            DbError::QueryFailed("disk full".into()),
        );
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.step, Some(WriteStep::CreateOrder));
        assert!(!err.is_partial());
    }

    #[test]
    fn test_failed_at_later_step_is_partial() {
        let err = ApiError::failed_at(
            WriteStep::DecrementStock,
            &[WriteStep::CreateOrder, WriteStep::CreateLines],
            Some("abcdef12-0000"),
            DbError::QueryFailed("no more stock updates".into()),
        );
        assert!(err.is_partial());
        assert_eq!(err.order_id.as_deref(), Some("abcdef12-0000"));
        assert!(err.message.starts_with("decrement stock failed after create order, create order lines"));
        assert!(err.message.contains("no more stock updates"));
        assert!(err.message.contains("#ABCDEF12"));
    }

    #[test]
    fn test_serialization_shape() {
        let err = ApiError::failed_at(
            WriteStep::PostCashEntry,
            &[WriteStep::CreateOrder],
            Some("o-1"),
            ApiError::internal("boom"),
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "PARTIAL_WRITE");
        assert_eq!(json["step"], "post_cash_entry");
        assert_eq!(json["orderId"], "o-1");

        let plain = serde_json::to_value(ApiError::validation("x")).unwrap();
        assert!(plain.get("step").is_none());
    }

    #[test]
    fn test_session_classification() {
        assert_eq!(
            classify_session_failure("JWT expired", None, None, "/admin/orders"),
            SessionAction::SignOutAndLogin
        );
        assert_eq!(
            classify_session_failure("unauthorized", Some(401), None, "/"),
            SessionAction::SignOutAndReload
        );
        assert_eq!(
            classify_session_failure("nope", None, Some("401"), "/shop"),
            SessionAction::SignOutAndReload
        );
        assert_eq!(
            classify_session_failure("duplicate key", Some(409), None, "/admin"),
            SessionAction::Keep
        );
    }
}
