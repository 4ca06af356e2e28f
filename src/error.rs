//! Typed errors and HTTP mapping.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::service::ValidationResult;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("duplicate route name '{name}' for resource {resource}")]
    DuplicateRouteName { resource: &'static str, name: String },
    #[error("route '{route}' has no handler: {reason}")]
    MissingHandler { route: String, reason: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("resource name '{0}' is bound to more than one model type")]
    ResourceConflict(&'static str),
    #[error("route template '{template}' is used by both {first} and {second}")]
    DuplicateTemplate { template: String, first: String, second: String },
    #[error("no route configured for {verb} on {resource}")]
    NoRoute { resource: &'static str, verb: String },
    #[error("settings: {0}")]
    Settings(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{verb} not allowed")]
    MethodNotAllowed { verb: String, allow: String },
    #[error("validation failed")]
    Validation(ValidationResult),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("handler failed: {0}")]
    Handler(anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration_error",
            AppError::NotFound(_) => "not_found",
            AppError::MethodNotAllowed { .. } => "method_not_allowed",
            AppError::Validation(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Handler(_) => "internal_error",
        }
    }

    /// Builds the response; handler failure text is only exposed when `verbose` is set.
    pub fn to_response(&self, verbose: bool) -> Response {
        let (message, details) = match self {
            AppError::Validation(result) => (self.to_string(), serde_json::to_value(&result.errors).ok()),
            AppError::Handler(e) if verbose => (
                "internal server error".to_string(),
                Some(serde_json::json!({ "exception": format!("{:#}", e) })),
            ),
            AppError::Handler(_) => ("internal server error".to_string(), None),
            _ => (self.to_string(), None),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                details,
            },
        };
        let mut response = (self.status(), Json(body)).into_response();
        if let AppError::MethodNotAllowed { allow, .. } = self {
            if let Ok(value) = HeaderValue::from_str(allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}
