//! A single configured binding of (resource, verb, optional key) to handler logic.
//!
//! Handler slots are filled through the fluent methods during configuration and are read-only
//! once the owning registry has been frozen by [`Binder::build`](crate::Binder::build).

use crate::config::{RouteMetadata, RouteOptions, RouteTemplate};
use crate::error::ConfigError;
use crate::model::{key_type_name, ApiModel};
use crate::response::Responder;
use crate::verb::Verb;
use axum::response::Response;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type Key<T> = <T as ApiModel>::Key;

pub(crate) type CollectionReader<T> = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<Vec<T>>> + Send + Sync>;
pub(crate) type ItemReader<T> = Box<dyn Fn(Key<T>) -> BoxFuture<'static, anyhow::Result<Option<T>>> + Send + Sync>;
pub(crate) type Creator<T> = Box<dyn Fn(T) -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;
pub(crate) type Updater<T> = Box<dyn Fn(Key<T>, T) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
pub(crate) type Deleter<T> = Box<dyn Fn(Key<T>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
pub(crate) type Reply = Box<dyn Fn(Responder) -> BoxFuture<'static, anyhow::Result<Response>> + Send + Sync>;
pub(crate) type ReplyWithId<T> =
    Box<dyn Fn(Responder, Key<T>) -> BoxFuture<'static, anyhow::Result<Response>> + Send + Sync>;
pub(crate) type ReplyWithModel<T> = Box<dyn Fn(Responder, T) -> BoxFuture<'static, anyhow::Result<Response>> + Send + Sync>;
pub(crate) type ReplyWithIdAndModel<T> =
    Box<dyn Fn(Responder, Key<T>, T) -> BoxFuture<'static, anyhow::Result<Response>> + Send + Sync>;

fn boxed<F>(fut: F) -> BoxFuture<'static, F::Output>
where
    F: Future + Send + 'static,
{
    Box::pin(fut)
}

fn boxed_ok<T: Send + 'static>(value: T) -> BoxFuture<'static, anyhow::Result<T>> {
    Box::pin(std::future::ready(Ok(value)))
}

pub struct Route<T: ApiModel> {
    name: String,
    template: RouteTemplate,
    verb: Verb,
    key_type: Option<&'static str>,
    pub(crate) collection_reader: Option<CollectionReader<T>>,
    pub(crate) item_reader: Option<ItemReader<T>>,
    pub(crate) creator: Option<Creator<T>>,
    pub(crate) updater: Option<Updater<T>>,
    pub(crate) deleter: Option<Deleter<T>>,
    pub(crate) reply: Option<Reply>,
    pub(crate) reply_with_id: Option<ReplyWithId<T>>,
    pub(crate) reply_with_model: Option<ReplyWithModel<T>>,
    pub(crate) reply_with_id_and_model: Option<ReplyWithIdAndModel<T>>,
}

impl<T: ApiModel> Route<T> {
    /// Creates an unconfigured route. Name and template fall back to the derived forms.
    pub fn new(verb: Verb, keyed: bool, options: &RouteOptions) -> Result<Self, ConfigError> {
        options.check()?;
        let key_type = keyed.then(key_type_name::<Key<T>>);
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| Self::derived_name(&verb, key_type));
        let template = match &options.template {
            Some(t) => RouteTemplate::parse(t)?,
            None => RouteTemplate::derived(T::RESOURCE, keyed),
        };
        if keyed && !template.has_params() {
            return Err(ConfigError::InvalidArgument(format!(
                "route '{}' takes a key but template '{}' has no parameter",
                name, template
            )));
        }
        Ok(Route {
            name,
            template,
            verb,
            key_type,
            collection_reader: None,
            item_reader: None,
            creator: None,
            updater: None,
            deleter: None,
            reply: None,
            reply_with_id: None,
            reply_with_model: None,
            reply_with_id_and_model: None,
        })
    }

    /// `Customer.GET` or `Customer.GET.i32`.
    pub fn derived_name(verb: &Verb, key_type: Option<&str>) -> String {
        match key_type {
            Some(k) => format!("{}.{}.{}", T::RESOURCE, verb, k),
            None => format!("{}.{}", T::RESOURCE, verb),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    pub fn is_keyed(&self) -> bool {
        self.key_type.is_some()
    }

    pub fn metadata(&self) -> RouteMetadata {
        RouteMetadata {
            resource: T::RESOURCE,
            name: self.name.clone(),
            template: self.template.clone(),
            verb: self.verb.clone(),
            key_type: self.key_type,
        }
    }

    pub fn has_custom_reply(&self) -> bool {
        self.reply.is_some()
            || self.reply_with_id.is_some()
            || self.reply_with_model.is_some()
            || self.reply_with_id_and_model.is_some()
    }

    /// True when at least one handler slot or custom reply is set.
    pub fn is_configured(&self) -> bool {
        self.has_custom_reply()
            || self.collection_reader.is_some()
            || self.item_reader.is_some()
            || self.creator.is_some()
            || self.updater.is_some()
            || self.deleter.is_some()
    }

    pub(crate) fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn read_using<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> Vec<T> + Send + Sync + 'static,
    {
        self.collection_reader = Some(Box::new(move || boxed_ok(f())));
        self
    }

    pub fn read_using_async<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
    {
        self.collection_reader = Some(Box::new(move || boxed(f())));
        self
    }

    pub fn read_item_using<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Key<T>) -> Option<T> + Send + Sync + 'static,
    {
        self.item_reader = Some(Box::new(move |id| boxed_ok(f(id))));
        self
    }

    pub fn read_item_using_async<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Key<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<T>>> + Send + 'static,
    {
        self.item_reader = Some(Box::new(move |id| boxed(f(id))));
        self
    }

    /// `f` returns the stored model, e.g. with a server-assigned key.
    pub fn create_using<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.creator = Some(Box::new(move |model| boxed_ok(f(model))));
        self
    }

    pub fn create_using_async<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.creator = Some(Box::new(move |model| boxed(f(model))));
        self
    }

    pub fn update_using<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Key<T>, T) + Send + Sync + 'static,
    {
        self.updater = Some(Box::new(move |id, model| {
            f(id, model);
            boxed_ok(())
        }));
        self
    }

    pub fn update_using_async<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Key<T>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.updater = Some(Box::new(move |id, model| boxed(f(id, model))));
        self
    }

    pub fn delete_using<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Key<T>) + Send + Sync + 'static,
    {
        self.deleter = Some(Box::new(move |id| {
            f(id);
            boxed_ok(())
        }));
        self
    }

    pub fn delete_using_async<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Key<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.deleter = Some(Box::new(move |id| boxed(f(id))));
        self
    }

    pub fn reply_with<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Responder) -> Response + Send + Sync + 'static,
    {
        self.reply = Some(Box::new(move |r| boxed_ok(f(r))));
        self
    }

    pub fn reply_with_async<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Responder) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        self.reply = Some(Box::new(move |r| boxed(f(r))));
        self
    }

    pub fn reply_with_id<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Responder, Key<T>) -> Response + Send + Sync + 'static,
    {
        self.reply_with_id = Some(Box::new(move |r, id| boxed_ok(f(r, id))));
        self
    }

    pub fn reply_with_id_async<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Responder, Key<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        self.reply_with_id = Some(Box::new(move |r, id| boxed(f(r, id))));
        self
    }

    pub fn reply_with_model<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Responder, T) -> Response + Send + Sync + 'static,
    {
        self.reply_with_model = Some(Box::new(move |r, model| boxed_ok(f(r, model))));
        self
    }

    pub fn reply_with_id_and_model<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Responder, Key<T>, T) -> Response + Send + Sync + 'static,
    {
        self.reply_with_id_and_model = Some(Box::new(move |r, id, model| boxed_ok(f(r, id, model))));
        self
    }
}

impl<T: ApiModel> std::fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("verb", &self.verb)
            .field("key_type", &self.key_type)
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Customer;

    #[test]
    fn derived_name_and_template() {
        let list = Route::<Customer>::new(Verb::GET, false, &RouteOptions::default()).unwrap();
        assert_eq!(list.name(), "Customer.GET");
        assert_eq!(list.template().as_str(), "api/Customer");
        let item = Route::<Customer>::new(Verb::GET, true, &RouteOptions::default()).unwrap();
        assert_eq!(item.name(), "Customer.GET.i32");
        assert_eq!(item.template().as_str(), "api/Customer/{id}");
        assert_eq!(item.metadata().key_type, Some("i32"));
    }

    #[test]
    fn explicit_options_win() {
        let opts = RouteOptions::named("GetFullNameFromCustomer").template("api/Customer/{id}/Fullname");
        let route = Route::<Customer>::new(Verb::GET, true, &opts).unwrap();
        assert_eq!(route.name(), "GetFullNameFromCustomer");
        assert_eq!(route.template().as_str(), "api/Customer/{id}/Fullname");
    }

    #[test]
    fn keyed_route_needs_template_parameter() {
        let opts = RouteOptions::default().template("api/Customer/all");
        assert!(matches!(
            Route::<Customer>::new(Verb::DELETE, true, &opts),
            Err(ConfigError::InvalidArgument(_))
        ));
    }

    #[test]
    fn slots_mark_route_configured() {
        let mut route = Route::<Customer>::new(Verb::GET, false, &RouteOptions::default()).unwrap();
        assert!(!route.is_configured());
        route.read_using(Vec::new);
        assert!(route.is_configured());
        assert!(!route.has_custom_reply());
        route.reply_with(|r| r.ok_empty());
        assert!(route.has_custom_reply());
    }
}
