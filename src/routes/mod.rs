//! Router assembly: resource routes, common routes, and the tower-http layers around them.

pub mod common;
pub mod resource;

pub use common::common_routes;

use crate::config::Settings;
use crate::registry::ApiRegistry;
use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

/// Every resource template of `registry`, without common routes or layers.
pub fn resource_routes(registry: &ApiRegistry, state: AppState) -> Router {
    registry.router(state)
}

/// The full application: resource and common routes with body limit, panic catching and the
/// optional request timeout.
pub fn app(registry: &ApiRegistry, settings: &Settings) -> Router {
    app_with_state(registry, settings, AppState::from_settings(settings))
}

pub fn app_with_state(registry: &ApiRegistry, settings: &Settings, state: AppState) -> Router {
    let mut router = resource_routes(registry, state).merge(common_routes());
    if let Some(timeout) = settings.request_timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }
    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::new())
            .layer(RequestBodyLimitLayer::new(settings.body_limit)),
    )
}
