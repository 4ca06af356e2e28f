//! Response building for default replies and custom reply handlers.

use crate::config::RouteMetadata;
use crate::error::{AppError, ConfigError, ErrorBody, ErrorDetail};
use crate::service::ValidationResult;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;

/// Scoped response builder handed to custom reply functions.
///
/// Carries the routes of the current resource so replies can point at sibling routes
/// (`created_at_route`), and the verbose-errors setting of the running app.
#[derive(Clone)]
pub struct Responder {
    routes: Arc<[RouteMetadata]>,
    verbose_errors: bool,
}

impl Responder {
    pub(crate) fn new(routes: Arc<[RouteMetadata]>, verbose_errors: bool) -> Self {
        Responder { routes, verbose_errors }
    }

    pub fn ok<B: Serialize>(&self, body: B) -> Response {
        (StatusCode::OK, Json(body)).into_response()
    }

    pub fn ok_empty(&self) -> Response {
        StatusCode::OK.into_response()
    }

    pub fn created<B: Serialize>(&self, location: &str, body: B) -> Response {
        let mut response = (StatusCode::CREATED, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(location) {
            response.headers_mut().insert(header::LOCATION, value);
        }
        response
    }

    /// 201 with a `Location` built from the named route of this resource. Unknown names are a 500.
    pub fn created_at_route<B: Serialize>(&self, route_name: &str, id: impl Display, body: B) -> Response {
        match self.location_for(route_name, &id.to_string()) {
            Some(location) => self.created(&location, body),
            None => self.internal_error(format!("no route named '{}'", route_name)),
        }
    }

    pub fn no_content(&self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }

    pub fn not_found(&self) -> Response {
        AppError::NotFound("resource".into()).to_response(self.verbose_errors)
    }

    pub fn bad_request(&self, message: impl Into<String>) -> Response {
        AppError::BadRequest(message.into()).to_response(self.verbose_errors)
    }

    pub fn invalid(&self, result: ValidationResult) -> Response {
        AppError::Validation(result).to_response(self.verbose_errors)
    }

    pub fn method_not_allowed(&self, allow: &str) -> Response {
        AppError::MethodNotAllowed {
            verb: "method".into(),
            allow: allow.to_string(),
        }
        .to_response(self.verbose_errors)
    }

    /// 500 carrying `detail` only when verbose errors are enabled.
    pub fn internal_error(&self, detail: impl Into<String>) -> Response {
        let detail = detail.into();
        let body = ErrorBody {
            error: ErrorDetail {
                code: "internal_error".into(),
                message: "internal server error".into(),
                details: self.verbose_errors.then(|| serde_json::json!({ "detail": detail })),
            },
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }

    pub fn status(&self, status: StatusCode) -> Response {
        status.into_response()
    }

    pub(crate) fn config_error(&self, error: ConfigError) -> Response {
        AppError::Config(error).to_response(self.verbose_errors)
    }

    pub(crate) fn location_for(&self, route_name: &str, id: &str) -> Option<String> {
        let route = self.routes.iter().find(|r| r.name.eq_ignore_ascii_case(route_name))?;
        let param = route.template.key_param().unwrap_or("id");
        Some(route.template.expand(&[(param, id)]))
    }
}
