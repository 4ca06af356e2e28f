//! Request-time services: dispatch, validation, and failure reporting.

mod dispatcher;
mod exception;
mod validation;
pub use dispatcher::{DispatchRequest, Dispatcher, Payload};
pub use exception::{ExceptionContext, ExceptionLogger, TracingExceptionLogger};
pub use validation::{
    DefaultValidator, FieldError, ModelValidator, RuleValidator, ValidationResult, ValidationRule,
};
