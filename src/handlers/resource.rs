//! Resource handler: decodes verb, key and body from the request and hands them to the dispatcher.

use crate::config::{RouteMetadata, RouteTemplate};
use crate::model::ApiModel;
use crate::registry::RouteRegistry;
use crate::service::{DispatchRequest, Dispatcher, Payload};
use crate::state::AppState;
use crate::verb::Verb;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-template state: the resource registry and the template the request matched.
pub struct MountState<T: ApiModel> {
    pub(crate) registry: Arc<RouteRegistry<T>>,
    pub(crate) routes: Arc<[RouteMetadata]>,
    pub(crate) template: RouteTemplate,
    pub(crate) app: AppState,
}

impl<T: ApiModel> Clone for MountState<T> {
    fn clone(&self) -> Self {
        MountState {
            registry: Arc::clone(&self.registry),
            routes: Arc::clone(&self.routes),
            template: self.template.clone(),
            app: self.app.clone(),
        }
    }
}

fn parse_key<T: ApiModel>(
    template: &RouteTemplate,
    params: &HashMap<String, String>,
) -> Option<Result<T::Key, String>> {
    let param = template.key_param()?;
    Some(match params.get(param) {
        Some(raw) => raw
            .parse::<T::Key>()
            .map_err(|_| format!("invalid {} '{}'", param, raw)),
        None => Err(format!("missing path parameter '{}'", param)),
    })
}

fn decode_body<T: ApiModel>(verb: &Verb, body: &Bytes) -> Payload<T> {
    if !verb.carries_body() || body.iter().all(u8::is_ascii_whitespace) {
        return Payload::Empty;
    }
    match serde_json::from_slice::<T>(body) {
        Ok(model) => Payload::Model(model),
        Err(e) => Payload::Malformed(e.to_string()),
    }
}

/// Catch-all handler mounted once per template; every method lands here.
pub async fn dispatch<T: ApiModel>(
    State(mount): State<MountState<T>>,
    method: Method,
    params: Option<Path<HashMap<String, String>>>,
    body: Bytes,
) -> Response {
    let verb = Verb::from(&method);
    let params = params.map(|Path(p)| p).unwrap_or_default();
    let route_name = mount
        .registry
        .routes()
        .iter()
        .find(|r| r.template() == &mount.template && r.verb() == &verb)
        .map(|r| r.name().to_string());
    let request = DispatchRequest {
        key: parse_key::<T>(&mount.template, &params),
        payload: decode_body::<T>(&verb, &body),
        route_name,
        verb,
    };
    Dispatcher::new(&mount.registry, &mount.app, Arc::clone(&mount.routes))
        .dispatch(request)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Customer;

    #[test]
    fn key_follows_template_parameter() {
        let template = RouteTemplate::derived("Customer", true);
        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        assert_eq!(parse_key::<Customer>(&template, &params), Some(Ok(42)));
        params.insert("id".to_string(), "abc".to_string());
        assert!(matches!(parse_key::<Customer>(&template, &params), Some(Err(_))));
        assert_eq!(parse_key::<Customer>(&RouteTemplate::derived("Customer", false), &params), None);
    }

    #[test]
    fn body_decoding() {
        let body = Bytes::from_static(br#"{"id":3,"firstName":"Wesley","lastName":"Cabus"}"#);
        assert!(matches!(decode_body::<Customer>(&Verb::POST, &body), Payload::Model(c) if c.id == 3));
        assert!(matches!(decode_body::<Customer>(&Verb::GET, &body), Payload::Empty));
        assert!(matches!(decode_body::<Customer>(&Verb::PUT, &Bytes::new()), Payload::Empty));
        assert!(matches!(
            decode_body::<Customer>(&Verb::POST, &Bytes::from_static(b"{nope")),
            Payload::Malformed(_)
        ));
    }
}
