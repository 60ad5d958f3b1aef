use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

/// Error body carried inside the failure envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Employee not found")]
    pub message: String,
    /// Stable machine-readable code for client-side branching
    #[schema(example = "EMPLOYEE_NOT_FOUND")]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
}

/// Standard error response: `{"success": false, "error": {...}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("{message}")]
    Forbidden {
        code: &'static str,
        message: String,
        details: Option<Value>,
    },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("{message}")]
    IllegalState { code: &'static str, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>, details: Option<Value>) -> Self {
        AppError::Forbidden {
            code,
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        AppError::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn illegal_state(code: &'static str, message: impl Into<String>) -> Self {
        AppError::IllegalState {
            code,
            message: message.into(),
        }
    }

    pub fn access_token_required() -> Self {
        Self::unauthorized("ACCESS_TOKEN_REQUIRED", "Access token is required")
    }

    pub fn invalid_token() -> Self {
        Self::unauthorized("INVALID_TOKEN", "Invalid or expired token")
    }

    pub fn authentication_required() -> Self {
        Self::unauthorized("AUTHENTICATION_REQUIRED", "Authentication required")
    }

    pub fn invalid_refresh_token() -> Self {
        Self::unauthorized("INVALID_REFRESH_TOKEN", "Invalid or expired refresh token")
    }

    pub fn employee_not_found() -> Self {
        Self::not_found("EMPLOYEE_NOT_FOUND", "Employee not found")
    }

    /// Stable code exposed in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::IllegalState { code, .. } => *code,
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) => "INVALID_TOKEN",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. } | AppError::IllegalState { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures that mean "the caller is not who they claim to be".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, AppError::Unauthorized { .. } | AppError::Jwt(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            AppError::Forbidden {
                message, details, ..
            } => (message, details),
            AppError::Database(e) => {
                tracing::error!(error = ?e, "Database error");
                ("Database error".to_string(), None)
            }
            AppError::Jwt(_) => ("Invalid or expired token".to_string(), None),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error");
                ("Internal error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let mut error = json!({ "message": message, "code": code });
        if let Some(details) = details {
            error["details"] = details;
        }

        let body = Json(json!({ "success": false, "error": error }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("INVALID_REQUEST_BODY", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation("INVALID_PATH", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("INVALID_QUERY", rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
