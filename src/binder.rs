//! Binder: the fluent startup surface that declares routes per resource type.
//!
//! ```ignore
//! let mut binder = Binder::new();
//! binder.on_get::<Customer>()?.read_using(list_customers);
//! binder.on_get_by_id::<Customer>()?.read_item_using(find_customer);
//! let registry = binder.build()?;
//! ```

use crate::config::{self, Operation, RouteOptions};
use crate::error::ConfigError;
use crate::model::ApiModel;
use crate::registry::{ApiRegistry, ResourceRoutes, RouteRegistry};
use crate::route::Route;
use crate::service::ModelValidator;
use crate::store::DataProvider;
use crate::verb::Verb;
use std::sync::Arc;

#[derive(Default)]
pub struct Binder {
    resources: Vec<Box<dyn ResourceRoutes>>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for `T`, created on first use. A resource tag claimed by another type is a conflict.
    pub fn registry_mut<T: ApiModel>(&mut self) -> Result<&mut RouteRegistry<T>, ConfigError> {
        let idx = match self.resources.iter().position(|r| r.resource() == T::RESOURCE) {
            Some(idx) => idx,
            None => {
                self.resources.push(Box::new(RouteRegistry::<T>::new()));
                self.resources.len() - 1
            }
        };
        self.resources[idx]
            .as_any_mut()
            .downcast_mut::<RouteRegistry<T>>()
            .ok_or(ConfigError::ResourceConflict(T::RESOURCE))
    }

    fn on<T: ApiModel>(&mut self, verb: Verb, keyed: bool, options: &RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        self.registry_mut::<T>()?.get_or_create(verb, keyed, options)
    }

    pub fn on_get<T: ApiModel>(&mut self) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::GET, false, &RouteOptions::default())
    }

    pub fn on_get_with<T: ApiModel>(&mut self, options: RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::GET, false, &options)
    }

    pub fn on_get_by_id<T: ApiModel>(&mut self) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::GET, true, &RouteOptions::default())
    }

    pub fn on_get_by_id_with<T: ApiModel>(&mut self, options: RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::GET, true, &options)
    }

    pub fn on_post<T: ApiModel>(&mut self) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::POST, false, &RouteOptions::default())
    }

    pub fn on_post_with<T: ApiModel>(&mut self, options: RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::POST, false, &options)
    }

    pub fn on_put<T: ApiModel>(&mut self) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::PUT, true, &RouteOptions::default())
    }

    pub fn on_put_with<T: ApiModel>(&mut self, options: RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::PUT, true, &options)
    }

    pub fn on_delete<T: ApiModel>(&mut self) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::DELETE, true, &RouteOptions::default())
    }

    pub fn on_delete_with<T: ApiModel>(&mut self, options: RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::DELETE, true, &options)
    }

    /// Route for any verb token, e.g. `MERGE` or `ARCHIVE`, on the collection template.
    pub fn on_custom_verb<T: ApiModel>(&mut self, token: &str) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::new(token)?, false, &RouteOptions::default())
    }

    pub fn on_custom_verb_with<T: ApiModel>(&mut self, token: &str, options: RouteOptions) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::new(token)?, false, &options)
    }

    pub fn on_custom_verb_by_id<T: ApiModel>(&mut self, token: &str) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::new(token)?, true, &RouteOptions::default())
    }

    pub fn on_custom_verb_by_id_with<T: ApiModel>(
        &mut self,
        token: &str,
        options: RouteOptions,
    ) -> Result<&mut Route<T>, ConfigError> {
        self.on(Verb::new(token)?, true, &options)
    }

    /// Replaces the default [`ApiModel::validate`] check for `T`.
    pub fn validate_with<T: ApiModel>(&mut self, validator: impl ModelValidator<T> + 'static) -> Result<&mut Self, ConfigError> {
        self.registry_mut::<T>()?.set_validator(validator);
        Ok(self)
    }

    /// Declares the standard routes for each operation and wires them to `provider`.
    ///
    /// `Read` binds the collection and by-id GETs, `Create` the POST, `Update` the PUT and
    /// `Delete` the DELETE. Routes declared earlier are reused, so custom replies stay in place.
    pub fn bind_provider<T, P>(&mut self, provider: Arc<P>, operations: &[Operation]) -> Result<&mut Self, ConfigError>
    where
        T: ApiModel,
        P: DataProvider<T> + ?Sized + 'static,
    {
        for op in operations {
            match op {
                Operation::Read => {
                    let p = provider.clone();
                    self.on_get::<T>()?.read_using_async(move || {
                        let p = p.clone();
                        async move { p.list().await }
                    });
                    let p = provider.clone();
                    self.on_get_by_id::<T>()?.read_item_using_async(move |id| {
                        let p = p.clone();
                        async move { p.get(&id).await }
                    });
                }
                Operation::Create => {
                    let p = provider.clone();
                    self.on_post::<T>()?.create_using_async(move |model| {
                        let p = p.clone();
                        async move { p.create(model).await }
                    });
                }
                Operation::Update => {
                    let (p, reader) = (provider.clone(), provider.clone());
                    self.on_put::<T>()?
                        .update_using_async(move |id, model| {
                            let p = p.clone();
                            async move { p.update(&id, model).await }
                        })
                        .read_item_using_async(move |id| {
                            let p = reader.clone();
                            async move { p.get(&id).await }
                        });
                }
                Operation::Delete => {
                    let (p, reader) = (provider.clone(), provider.clone());
                    self.on_delete::<T>()?
                        .delete_using_async(move |id| {
                            let p = p.clone();
                            async move { p.delete(&id).await }
                        })
                        .read_item_using_async(move |id| {
                            let p = reader.clone();
                            async move { p.get(&id).await }
                        });
                }
            }
        }
        tracing::debug!(resource = T::RESOURCE, ?operations, "bound data provider");
        Ok(self)
    }

    /// Every declared route can serve requests. Not run by [`build`](Self::build), where
    /// unconfigured routes surface as 500s at request time instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for resource in &self.resources {
            resource.validate()?;
        }
        self.check_templates()
    }

    fn check_templates(&self) -> Result<(), ConfigError> {
        let routes: Vec<_> = self.resources.iter().flat_map(|r| r.metadata()).collect();
        config::validate_templates(&routes)
    }

    /// Freezes the declared routes. Template conflicts fail here since they cannot be mounted.
    pub fn build(self) -> Result<ApiRegistry, ConfigError> {
        self.check_templates()?;
        let resources: Vec<Arc<dyn ResourceRoutes>> = self.resources.into_iter().map(Arc::from).collect();
        Ok(ApiRegistry::new(resources))
    }
}
