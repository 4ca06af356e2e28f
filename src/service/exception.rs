//! Reporting of handler failures caught at the dispatch boundary.

use crate::verb::Verb;

/// Where a handler failure happened.
#[derive(Debug, Clone, Copy)]
pub struct ExceptionContext<'a> {
    pub resource: &'static str,
    pub route: &'a str,
    pub verb: &'a Verb,
}

pub trait ExceptionLogger: Send + Sync {
    fn log(&self, context: &ExceptionContext<'_>, error: &anyhow::Error);
}

/// Default logger: one `error!` event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingExceptionLogger;

impl ExceptionLogger for TracingExceptionLogger {
    fn log(&self, context: &ExceptionContext<'_>, error: &anyhow::Error) {
        tracing::error!(
            resource = context.resource,
            route = context.route,
            verb = %context.verb,
            error = %format!("{:#}", error),
            "handler failed"
        );
    }
}
