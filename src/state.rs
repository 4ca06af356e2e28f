//! Shared application state for all resource routes.

use crate::config::Settings;
use crate::service::{ExceptionLogger, TracingExceptionLogger};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub verbose_errors: bool,
    /// Receives every handler failure before it becomes a 500.
    pub exception_logger: Arc<dyn ExceptionLogger>,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            verbose_errors: false,
            exception_logger: Arc::new(TracingExceptionLogger),
        }
    }
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        AppState {
            verbose_errors: settings.verbose_errors,
            ..AppState::default()
        }
    }

    pub fn with_exception_logger(mut self, logger: Arc<dyn ExceptionLogger>) -> Self {
        self.exception_logger = logger;
        self
    }
}
