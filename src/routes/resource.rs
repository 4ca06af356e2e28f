//! Resource routes: each distinct template of a registry is mounted once with a catch-all method
//! handler, so custom verbs reach the dispatcher too.

use crate::config::RouteMetadata;
use crate::handlers::resource::{dispatch, MountState};
use crate::model::ApiModel;
use crate::registry::RouteRegistry;
use crate::state::AppState;
use axum::{routing::any, Router};
use std::sync::Arc;

pub(crate) fn mount_registry<T: ApiModel>(registry: Arc<RouteRegistry<T>>, router: Router, app: AppState) -> Router {
    let routes: Arc<[RouteMetadata]> = registry.metadata().into();
    registry.templates().into_iter().fold(router, |router, template| {
        let path = template.axum_path();
        tracing::info!(resource = T::RESOURCE, path = %path, verbs = %registry.allow_header(), "mounted route");
        let state = MountState {
            registry: Arc::clone(&registry),
            routes: Arc::clone(&routes),
            template,
            app: app.clone(),
        };
        router.route(&path, any(dispatch::<T>).with_state(state))
    })
}
