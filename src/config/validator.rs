//! Route validation: servability of each route and template consistency across resources.

use crate::config::RouteMetadata;
use crate::error::ConfigError;
use crate::model::ApiModel;
use crate::registry::RouteRegistry;
use crate::verb::Verb;
use std::collections::HashMap;

fn missing(route: &str, reason: &str) -> ConfigError {
    ConfigError::MissingHandler {
        route: route.to_string(),
        reason: reason.to_string(),
    }
}

/// Every route of the registry can serve a request with its default or custom reply.
pub fn validate_registry<T: ApiModel>(registry: &RouteRegistry<T>) -> Result<(), ConfigError> {
    for route in registry.routes() {
        if route.has_custom_reply() {
            continue;
        }
        let name = route.name();
        let verb = route.verb();
        if *verb == Verb::GET && !route.is_keyed() {
            if route.collection_reader.is_none() {
                return Err(missing(name, "collection GET needs read_using"));
            }
        } else if *verb == Verb::GET {
            if registry.item_reader_for(route).is_none() {
                return Err(missing(name, "GET by id needs read_item_using"));
            }
        } else if *verb == Verb::POST {
            if route.creator.is_none() {
                return Err(missing(name, "POST needs create_using"));
            }
        } else if *verb == Verb::PUT || *verb == Verb::DELETE {
            if !route.is_keyed() {
                return Err(missing(name, "PUT and DELETE routes need a key"));
            }
            let slot = if *verb == Verb::PUT {
                route.updater.is_some()
            } else {
                route.deleter.is_some()
            };
            if !slot {
                return Err(missing(name, "no update_using or delete_using attached"));
            }
            if registry.item_reader_for(route).is_none() {
                return Err(missing(name, "no item reader on the route or a GET by id route"));
            }
        } else {
            return Err(missing(name, "custom verbs need a reply_with handler"));
        }
    }
    Ok(())
}

/// No two distinct templates may match the same paths, within or across resources.
pub fn validate_templates(routes: &[RouteMetadata]) -> Result<(), ConfigError> {
    let mut seen: HashMap<String, &RouteMetadata> = HashMap::new();
    for route in routes {
        let shape = route.template.shape();
        match seen.get(&shape) {
            Some(first) if first.resource != route.resource || first.template != route.template => {
                return Err(ConfigError::DuplicateTemplate {
                    template: route.template.to_string(),
                    first: format!("{}:{}", first.resource, first.name),
                    second: format!("{}:{}", route.resource, route.name),
                });
            }
            Some(_) => continue,
            None => {}
        }
        seen.insert(shape, route);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RouteOptions, RouteTemplate};
    use crate::test_support::Customer;

    fn meta(resource: &'static str, name: &str, template: &str) -> RouteMetadata {
        RouteMetadata {
            resource,
            name: name.into(),
            template: RouteTemplate::parse(template).unwrap(),
            verb: Verb::GET,
            key_type: None,
        }
    }

    #[test]
    fn unconfigured_route_is_reported() {
        let mut reg = RouteRegistry::<Customer>::new();
        reg.get_or_create(Verb::GET, false, &RouteOptions::default()).unwrap();
        let err = validate_registry(&reg).unwrap_err();
        assert!(matches!(err, ConfigError::MissingHandler { ref route, .. } if route == "Customer.GET"));
    }

    #[test]
    fn delete_borrows_reader_of_get_by_id() {
        let mut reg = RouteRegistry::<Customer>::new();
        reg.get_or_create(Verb::DELETE, true, &RouteOptions::default())
            .unwrap()
            .delete_using(|_| {});
        assert!(validate_registry(&reg).is_err());
        reg.get_or_create(Verb::GET, true, &RouteOptions::default())
            .unwrap()
            .read_item_using(|_| None);
        assert!(validate_registry(&reg).is_ok());
    }

    #[test]
    fn custom_verb_needs_reply() {
        let mut reg = RouteRegistry::<Customer>::new();
        let verb = Verb::new("archive").unwrap();
        reg.get_or_create(verb, true, &RouteOptions::default())
            .unwrap()
            .read_item_using(|_| None);
        assert!(validate_registry(&reg).is_err());
    }

    #[test]
    fn shared_template_across_resources_is_rejected() {
        let routes = vec![
            meta("Customer", "Customer.GET", "api/Customer"),
            meta("Customer", "Customer.POST", "api/Customer"),
            meta("Order", "Order.GET", "api/customer"),
        ];
        let err = validate_templates(&routes).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTemplate { .. }));
        assert!(validate_templates(&routes[..2]).is_ok());
    }

    #[test]
    fn renamed_parameter_conflicts() {
        let routes = vec![
            meta("Customer", "a", "api/Customer/{id}"),
            meta("Customer", "b", "api/Customer/{key}"),
        ];
        assert!(validate_templates(&routes).is_err());
    }
}
