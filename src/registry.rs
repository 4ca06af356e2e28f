//! Route registries: one ordered registry per resource, and the frozen process-wide map of them.

use crate::config::{self, RouteMetadata, RouteOptions, RouteTemplate};
use crate::error::ConfigError;
use crate::model::ApiModel;
use crate::route::{ItemReader, Route};
use crate::routes::resource::mount_registry;
use crate::service::{DefaultValidator, ModelValidator};
use crate::state::AppState;
use crate::verb::{join_verbs, Verb};
use axum::Router;
use std::any::Any;
use std::sync::Arc;

/// All routes declared for resource `T`, in registration order, plus the enabled verbs.
pub struct RouteRegistry<T: ApiModel> {
    routes: Vec<Route<T>>,
    enabled: Vec<Verb>,
    validator: Box<dyn ModelValidator<T>>,
}

impl<T: ApiModel> Default for RouteRegistry<T> {
    fn default() -> Self {
        RouteRegistry {
            routes: Vec::new(),
            enabled: Vec::new(),
            validator: Box::new(DefaultValidator),
        }
    }
}

impl<T: ApiModel> RouteRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `route` and enables its verb. Route names are unique per resource, ignoring case.
    pub fn register(&mut self, route: Route<T>) -> Result<&mut Route<T>, ConfigError> {
        if self.routes.iter().any(|r| r.matches_name(route.name())) {
            return Err(ConfigError::DuplicateRouteName {
                resource: T::RESOURCE,
                name: route.name().to_string(),
            });
        }
        self.enable_verb(route.verb().clone());
        self.routes.push(route);
        let last = self.routes.len() - 1;
        Ok(&mut self.routes[last])
    }

    /// Returns the route with the same name when it has the same verb and key shape,
    /// otherwise registers a new one.
    pub fn get_or_create(&mut self, verb: Verb, keyed: bool, options: &RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        let candidate = Route::<T>::new(verb, keyed, options)?;
        match self.routes.iter().position(|r| r.matches_name(candidate.name())) {
            Some(idx) => {
                let existing = &self.routes[idx];
                if existing.verb() != candidate.verb() || existing.is_keyed() != keyed {
                    return Err(ConfigError::DuplicateRouteName {
                        resource: T::RESOURCE,
                        name: candidate.name().to_string(),
                    });
                }
                Ok(&mut self.routes[idx])
            }
            None => self.register(candidate),
        }
    }

    pub fn enable_verb(&mut self, verb: Verb) {
        if !self.enabled.contains(&verb) {
            self.enabled.push(verb);
        }
    }

    /// By pre-matched route name first, else the first route with this verb and key shape.
    pub fn resolve(&self, verb: &Verb, requested_name: Option<&str>, key_present: bool) -> Option<&Route<T>> {
        if let Some(name) = requested_name {
            if let Some(route) = self.routes.iter().find(|r| r.matches_name(name)) {
                return Some(route);
            }
        }
        self.routes
            .iter()
            .find(|r| r.verb() == verb && r.is_keyed() == key_present)
    }

    pub fn is_verb_allowed(&self, verb: &Verb) -> bool {
        self.enabled.contains(verb)
    }

    pub fn enabled_verbs(&self) -> &[Verb] {
        &self.enabled
    }

    /// Value for `Allow` and `Access-Control-Allow-Methods`.
    pub fn allow_header(&self) -> String {
        join_verbs(&self.enabled)
    }

    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    pub fn route(&self, name: &str) -> Option<&Route<T>> {
        self.routes.iter().find(|r| r.matches_name(name))
    }

    /// The canonical item route: the first keyed GET route.
    pub fn item_route(&self) -> Option<&Route<T>> {
        self.routes.iter().find(|r| *r.verb() == Verb::GET && r.is_keyed())
    }

    /// The route's own item reader, else the first keyed GET route that has one.
    pub(crate) fn item_reader_for<'a>(&'a self, route: &'a Route<T>) -> Option<&'a ItemReader<T>> {
        route.item_reader.as_ref().or_else(|| {
            self.routes
                .iter()
                .filter(|r| *r.verb() == Verb::GET && r.is_keyed())
                .find_map(|r| r.item_reader.as_ref())
        })
    }

    pub fn set_validator(&mut self, validator: impl ModelValidator<T> + 'static) {
        self.validator = Box::new(validator);
    }

    pub fn validator(&self) -> &dyn ModelValidator<T> {
        self.validator.as_ref()
    }

    /// Distinct templates in registration order.
    pub fn templates(&self) -> Vec<RouteTemplate> {
        let mut out: Vec<RouteTemplate> = Vec::new();
        for route in &self.routes {
            if !out.contains(route.template()) {
                out.push(route.template().clone());
            }
        }
        out
    }

    pub fn metadata(&self) -> Vec<RouteMetadata> {
        self.routes.iter().map(Route::metadata).collect()
    }
}

/// Type-erased view of a [`RouteRegistry`], so registries of different resources share one map.
pub trait ResourceRoutes: Send + Sync + 'static {
    fn resource(&self) -> &'static str;
    fn metadata(&self) -> Vec<RouteMetadata>;
    fn validate(&self) -> Result<(), ConfigError>;
    fn mount(self: Arc<Self>, router: Router, state: AppState) -> Router;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: ApiModel> ResourceRoutes for RouteRegistry<T> {
    fn resource(&self) -> &'static str {
        T::RESOURCE
    }

    fn metadata(&self) -> Vec<RouteMetadata> {
        RouteRegistry::metadata(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        config::validate_registry(self)
    }

    fn mount(self: Arc<Self>, router: Router, state: AppState) -> Router {
        mount_registry(self, router, state)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Process-wide registry of every resource, frozen at build time and shared read-only.
#[derive(Clone)]
pub struct ApiRegistry {
    resources: Vec<Arc<dyn ResourceRoutes>>,
}

impl ApiRegistry {
    pub(crate) fn new(resources: Vec<Arc<dyn ResourceRoutes>>) -> Self {
        ApiRegistry { resources }
    }

    pub fn resource<T: ApiModel>(&self) -> Option<&RouteRegistry<T>> {
        self.resources
            .iter()
            .find(|r| r.resource() == T::RESOURCE)
            .and_then(|r| r.as_any().downcast_ref::<RouteRegistry<T>>())
    }

    pub fn resources(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.iter().map(|r| r.resource())
    }

    /// Every configured route across resources.
    pub fn routes(&self) -> Vec<RouteMetadata> {
        self.resources.iter().flat_map(|r| r.metadata()).collect()
    }

    /// Path for a named route of `resource` with its key parameter set to `id`.
    pub fn url_for(&self, resource: &str, route_name: &str, id: &str) -> Option<String> {
        let route = self
            .routes()
            .into_iter()
            .find(|r| r.resource == resource && r.name.eq_ignore_ascii_case(route_name))?;
        let param = route.template.key_param().unwrap_or("id");
        Some(route.template.expand(&[(param, id)]))
    }

    /// Mounts every template of every resource on a fresh router.
    pub fn router(&self, state: AppState) -> Router {
        self.resources
            .iter()
            .fold(Router::new(), |router, r| Arc::clone(r).mount(router, state.clone()))
    }
}
