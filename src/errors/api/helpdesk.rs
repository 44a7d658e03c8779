use crate::errors::internal::{InternalError, NotFoundError};
use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

/// Standardized error response for helpdesk endpoints
#[derive(Object, Debug)]
pub struct HelpdeskErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Helpdesk endpoint error types
#[derive(ApiResponse, Debug)]
pub enum HelpdeskApiError {
    /// Request failed validation
    #[oai(status = 400)]
    ValidationFailed(Json<HelpdeskErrorResponse>),

    /// Caller identity missing or unknown
    #[oai(status = 401)]
    Unauthenticated(Json<HelpdeskErrorResponse>),

    /// Caller lacks the required capability
    #[oai(status = 403)]
    Forbidden(Json<HelpdeskErrorResponse>),

    /// Referenced ticket, user or notification does not exist
    #[oai(status = 404)]
    NotFound(Json<HelpdeskErrorResponse>),

    /// Uniqueness conflict
    #[oai(status = 409)]
    Conflict(Json<HelpdeskErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<HelpdeskErrorResponse>),
}

fn body(error: &str, message: String, status_code: u16) -> Json<HelpdeskErrorResponse> {
    Json(HelpdeskErrorResponse {
        error: error.to_string(),
        message,
        status_code,
    })
}

impl HelpdeskApiError {
    pub fn validation_failed(reason: String) -> Self {
        HelpdeskApiError::ValidationFailed(body("validation_failed", reason, 400))
    }

    pub fn unauthenticated() -> Self {
        HelpdeskApiError::Unauthenticated(body(
            "unauthenticated",
            "A known user identity is required".to_string(),
            401,
        ))
    }

    pub fn forbidden(reason: String) -> Self {
        HelpdeskApiError::Forbidden(body("forbidden", reason, 403))
    }

    pub fn not_found(reason: String) -> Self {
        HelpdeskApiError::NotFound(body("not_found", reason, 404))
    }

    pub fn conflict(reason: String) -> Self {
        HelpdeskApiError::Conflict(body("conflict", reason, 409))
    }

    /// Always generic; internal details stay in the log
    fn internal_server_error() -> Self {
        HelpdeskApiError::InternalError(body(
            "internal_error",
            "An internal error occurred".to_string(),
            500,
        ))
    }

    /// Convert InternalError to HelpdeskApiError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Infrastructure error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Validation(e) => Self::validation_failed(e.to_string()),
            InternalError::Authorization(e) => Self::forbidden(e.to_string()),
            InternalError::NotFound(e) => Self::not_found(e.to_string()),
            InternalError::Conflict(e) => Self::conflict(e.to_string()),

            InternalError::Database(_) => {
                tracing::error!("Database error: {}", err);
                Self::internal_server_error()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }
            InternalError::Storage(_) => {
                tracing::error!("Storage error: {}", err);
                Self::internal_server_error()
            }
        }
    }

    /// Map an unknown caller identity to 401 rather than 404
    pub fn from_identity_error(err: InternalError) -> Self {
        match err {
            InternalError::NotFound(NotFoundError::User(_)) => Self::unauthenticated(),
            other => Self::from_internal_error(other),
        }
    }

    fn response(&self) -> &HelpdeskErrorResponse {
        match self {
            HelpdeskApiError::ValidationFailed(json)
            | HelpdeskApiError::Unauthenticated(json)
            | HelpdeskApiError::Forbidden(json)
            | HelpdeskApiError::NotFound(json)
            | HelpdeskApiError::Conflict(json)
            | HelpdeskApiError::InternalError(json) => &json.0,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.response().message.clone()
    }

    /// Get the HTTP status code from the error variant
    pub fn status_code(&self) -> u16 {
        self.response().status_code
    }
}

impl From<InternalError> for HelpdeskApiError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for HelpdeskApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
