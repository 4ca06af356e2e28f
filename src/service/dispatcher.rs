//! Dispatcher: resolves a route for a decoded request, runs its handler, and applies the default
//! reply semantics (200/201/204/400/404/405/500).

use crate::config::RouteMetadata;
use crate::error::{AppError, ConfigError};
use crate::model::ApiModel;
use crate::registry::RouteRegistry;
use crate::response::Responder;
use crate::route::Route;
use crate::service::ExceptionContext;
use crate::state::AppState;
use crate::verb::Verb;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Request body as decoded by the transport. Decoding failures are reported only once a route
/// actually needs the model, so verb checks still come first.
#[derive(Debug)]
pub enum Payload<T> {
    Empty,
    Model(T),
    Malformed(String),
}

impl<T> Payload<T> {
    fn into_model(self) -> Result<Option<T>, AppError> {
        match self {
            Payload::Empty => Ok(None),
            Payload::Model(m) => Ok(Some(m)),
            Payload::Malformed(reason) => Err(AppError::BadRequest(format!("malformed request body: {}", reason))),
        }
    }
}

/// One request, already decoded by the transport adapter.
pub struct DispatchRequest<T: ApiModel> {
    pub verb: Verb,
    /// Route name pre-matched by the transport from the request path.
    pub route_name: Option<String>,
    /// `None` when the matched template carries no key; `Some(Err)` when the key did not parse.
    pub key: Option<Result<T::Key, String>>,
    pub payload: Payload<T>,
}

impl<T: ApiModel> DispatchRequest<T> {
    pub fn new(verb: Verb) -> Self {
        DispatchRequest {
            verb,
            route_name: None,
            key: None,
            payload: Payload::Empty,
        }
    }

    pub fn named(mut self, route_name: impl Into<String>) -> Self {
        self.route_name = Some(route_name.into());
        self
    }

    pub fn with_key(mut self, key: T::Key) -> Self {
        self.key = Some(Ok(key));
        self
    }

    pub fn with_model(mut self, model: T) -> Self {
        self.payload = Payload::Model(model);
        self
    }
}

fn body_required() -> AppError {
    AppError::BadRequest("request body is required".into())
}

fn missing(route: &Route<impl ApiModel>, reason: &str) -> AppError {
    AppError::Config(ConfigError::MissingHandler {
        route: route.name().to_string(),
        reason: reason.to_string(),
    })
}

pub struct Dispatcher<'a, T: ApiModel> {
    registry: &'a RouteRegistry<T>,
    state: &'a AppState,
    responder: Responder,
}

impl<'a, T: ApiModel> Dispatcher<'a, T> {
    /// `routes` are the resource's route links handed to custom replies.
    pub fn new(registry: &'a RouteRegistry<T>, state: &'a AppState, routes: Arc<[RouteMetadata]>) -> Self {
        Dispatcher {
            registry,
            state,
            responder: Responder::new(routes, state.verbose_errors),
        }
    }

    pub fn for_registry(registry: &'a RouteRegistry<T>, state: &'a AppState) -> Self {
        Self::new(registry, state, registry.metadata().into())
    }

    pub async fn dispatch(&self, request: DispatchRequest<T>) -> Response {
        let DispatchRequest {
            verb,
            route_name,
            key,
            payload,
        } = request;
        let verbose = self.state.verbose_errors;

        if verb == Verb::OPTIONS {
            return self.options();
        }
        if !self.registry.is_verb_allowed(&verb) {
            tracing::debug!(resource = T::RESOURCE, verb = %verb, "verb not enabled");
            return AppError::MethodNotAllowed {
                verb: verb.to_string(),
                allow: self.registry.allow_header(),
            }
            .to_response(verbose);
        }
        let Some(route) = self.registry.resolve(&verb, route_name.as_deref(), key.is_some()) else {
            let err = ConfigError::NoRoute {
                resource: T::RESOURCE,
                verb: verb.to_string(),
            };
            tracing::warn!(error = %err, "configuration error at request time");
            return self.responder.config_error(err);
        };
        tracing::debug!(resource = T::RESOURCE, route = route.name(), verb = %verb, "dispatch");

        match self.run(route, &verb, key, payload).await {
            Ok(response) => response,
            Err(AppError::Handler(e)) => {
                let context = ExceptionContext {
                    resource: T::RESOURCE,
                    route: route.name(),
                    verb: &verb,
                };
                self.state.exception_logger.log(&context, &e);
                AppError::Handler(e).to_response(verbose)
            }
            Err(e @ AppError::Config(_)) => {
                tracing::warn!(route = route.name(), error = %e, "configuration error at request time");
                e.to_response(verbose)
            }
            Err(e) => e.to_response(verbose),
        }
    }

    fn options(&self) -> Response {
        let mut response = StatusCode::OK.into_response();
        if let Ok(value) = HeaderValue::from_str(&self.registry.allow_header()) {
            response.headers_mut().insert(header::ALLOW, value.clone());
            response
                .headers_mut()
                .insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
        }
        response
    }

    async fn run(
        &self,
        route: &Route<T>,
        verb: &Verb,
        key: Option<Result<T::Key, String>>,
        payload: Payload<T>,
    ) -> Result<Response, AppError> {
        let key = key.transpose().map_err(AppError::BadRequest)?;
        let model = payload.into_model()?;

        if route.has_custom_reply() {
            return self.custom_reply(route, key, model).await;
        }
        if *verb == Verb::GET {
            match key {
                Some(id) => self.get_item(route, id).await,
                None => self.get_collection(route).await,
            }
        } else if *verb == Verb::POST {
            self.post(route, model).await
        } else if *verb == Verb::PUT {
            let id = key.ok_or_else(|| missing(route, "PUT needs a keyed route"))?;
            self.put(route, id, model).await
        } else if *verb == Verb::DELETE {
            let id = key.ok_or_else(|| missing(route, "DELETE needs a keyed route"))?;
            self.delete(route, id).await
        } else {
            Err(missing(route, "custom verbs need a reply_with handler"))
        }
    }

    /// Most specific reply first: id and model, id, model, none.
    async fn custom_reply(&self, route: &Route<T>, key: Option<T::Key>, model: Option<T>) -> Result<Response, AppError> {
        let responder = self.responder.clone();
        match (key, model) {
            (Some(id), Some(model)) => {
                if let Some(f) = &route.reply_with_id_and_model {
                    return f(responder, id, model).await.map_err(AppError::Handler);
                }
                if let Some(f) = &route.reply_with_id {
                    return f(responder, id).await.map_err(AppError::Handler);
                }
                if let Some(f) = &route.reply_with_model {
                    return f(responder, model).await.map_err(AppError::Handler);
                }
            }
            (Some(id), None) => {
                if let Some(f) = &route.reply_with_id {
                    return f(responder, id).await.map_err(AppError::Handler);
                }
                let wants_body = route.reply_with_id_and_model.is_some() || route.reply_with_model.is_some();
                if wants_body && route.reply.is_none() {
                    return Err(body_required());
                }
            }
            (None, Some(model)) => {
                if let Some(f) = &route.reply_with_model {
                    return f(responder, model).await.map_err(AppError::Handler);
                }
            }
            (None, None) => {
                if route.reply_with_model.is_some() && route.reply.is_none() {
                    return Err(body_required());
                }
            }
        }
        match &route.reply {
            Some(f) => f(responder).await.map_err(AppError::Handler),
            None => Err(missing(route, "no custom reply matches the request parameters")),
        }
    }

    async fn get_collection(&self, route: &Route<T>) -> Result<Response, AppError> {
        let reader = route
            .collection_reader
            .as_ref()
            .ok_or_else(|| missing(route, "collection GET needs read_using"))?;
        let items = reader().await.map_err(AppError::Handler)?;
        Ok(self.responder.ok(items))
    }

    async fn get_item(&self, route: &Route<T>, id: T::Key) -> Result<Response, AppError> {
        let reader = self
            .registry
            .item_reader_for(route)
            .ok_or_else(|| missing(route, "GET by id needs read_item_using"))?;
        let not_found = id.to_string();
        match reader(id).await.map_err(AppError::Handler)? {
            Some(item) => Ok(self.responder.ok(item)),
            None => Err(AppError::NotFound(not_found)),
        }
    }

    async fn post(&self, route: &Route<T>, model: Option<T>) -> Result<Response, AppError> {
        let creator = route
            .creator
            .as_ref()
            .ok_or_else(|| missing(route, "POST needs create_using"))?;
        let model = model.ok_or_else(body_required)?;
        self.check(&model)?;
        let created = creator(model).await.map_err(AppError::Handler)?;
        match self.registry.item_route() {
            Some(item_route) => {
                let key = created.key().to_string();
                let param = item_route.template().key_param().unwrap_or("id");
                let location = item_route.template().expand(&[(param, key.as_str())]);
                Ok(self.responder.created(&location, created))
            }
            None => Ok(self.responder.ok(created)),
        }
    }

    async fn put(&self, route: &Route<T>, id: T::Key, model: Option<T>) -> Result<Response, AppError> {
        let updater = route
            .updater
            .as_ref()
            .ok_or_else(|| missing(route, "PUT needs update_using"))?;
        let reader = self
            .registry
            .item_reader_for(route)
            .ok_or_else(|| missing(route, "PUT needs an item reader"))?;
        if reader(id.clone()).await.map_err(AppError::Handler)?.is_none() {
            return Err(AppError::NotFound(id.to_string()));
        }
        let model = model.ok_or_else(body_required)?;
        self.check(&model)?;
        updater(id, model.clone()).await.map_err(AppError::Handler)?;
        Ok(self.responder.ok(model))
    }

    async fn delete(&self, route: &Route<T>, id: T::Key) -> Result<Response, AppError> {
        let deleter = route
            .deleter
            .as_ref()
            .ok_or_else(|| missing(route, "DELETE needs delete_using"))?;
        let reader = self
            .registry
            .item_reader_for(route)
            .ok_or_else(|| missing(route, "DELETE needs an item reader"))?;
        if reader(id.clone()).await.map_err(AppError::Handler)?.is_none() {
            return Err(AppError::NotFound(id.to_string()));
        }
        deleter(id).await.map_err(AppError::Handler)?;
        Ok(self.responder.no_content())
    }

    fn check(&self, model: &T) -> Result<(), AppError> {
        let result = self.registry.validator().validate(model);
        if result.is_valid() {
            Ok(())
        } else {
            Err(AppError::Validation(result))
        }
    }
}
