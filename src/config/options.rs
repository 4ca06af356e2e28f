//! Route options supplied at configuration time, and the route metadata exposed to the routing table.

use crate::error::ConfigError;
use crate::verb::Verb;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Explicit name and/or template for a route. Missing parts are derived from the resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteOptions {
    pub name: Option<String>,
    pub template: Option<String>,
}

impl RouteOptions {
    pub fn named(name: impl Into<String>) -> Self {
        RouteOptions {
            name: Some(name.into()),
            template: None,
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(ConfigError::InvalidArgument("route name must not be empty".into()));
        }
        if let Some(t) = &self.template {
            RouteTemplate::parse(t)?;
        }
        Ok(())
    }
}

/// URL path pattern such as `api/Customer/{id}`. Parameters are whole segments in braces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteTemplate(String);

impl RouteTemplate {
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let trimmed = template.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidArgument("route template must not be empty".into()));
        }
        let segments: Vec<&str> = trimmed.split('/').collect();
        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            let invalid = |reason: &str| {
                ConfigError::InvalidArgument(format!(
                    "invalid segment '{}' in route template '{}': {}",
                    segment, template, reason
                ))
            };
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => {
                    let (catch_all, name) = match param.strip_prefix('*') {
                        Some(name) => (true, name),
                        None => (false, param),
                    };
                    if name.is_empty() {
                        return Err(invalid("parameter name is empty"));
                    }
                    if name.contains(['{', '}', '*', ':', ' ']) {
                        return Err(invalid("parameter names are plain identifiers"));
                    }
                    if catch_all && i != last {
                        return Err(invalid("catch-all parameter must be the last segment"));
                    }
                }
                None if segment.contains(['{', '}']) => {
                    return Err(invalid("parameters must span the whole segment"));
                }
                None if segment.contains(['*', ':']) => {
                    return Err(invalid("'*' and ':' are only allowed inside parameters"));
                }
                None => {}
            }
        }
        Ok(RouteTemplate(trimmed.to_string()))
    }

    /// `api/{resource}` or `api/{resource}/{id}`.
    pub fn derived(resource: &str, keyed: bool) -> Self {
        if keyed {
            RouteTemplate(format!("api/{}/{{id}}", resource))
        } else {
            RouteTemplate(format!("api/{}", resource))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn params(&self) -> Vec<&str> {
        self.0
            .split('/')
            .filter_map(|s| s.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            .map(|s| s.trim_start_matches('*'))
            .collect()
    }

    pub fn has_params(&self) -> bool {
        self.0.contains('{')
    }

    /// The parameter carrying the resource key: `id` when present, else the first parameter.
    pub fn key_param(&self) -> Option<&str> {
        let params = self.params();
        params.iter().copied().find(|p| *p == "id").or_else(|| params.first().copied())
    }

    /// Path in axum's syntax, e.g. `/api/Customer/:id`.
    pub fn axum_path(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 1);
        for segment in self.0.split('/') {
            out.push('/');
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) if param.starts_with('*') => out.push_str(param),
                Some(param) => {
                    out.push(':');
                    out.push_str(param);
                }
                None => out.push_str(segment),
            }
        }
        out
    }

    /// Template with parameter names erased; two templates with the same shape match the same paths.
    pub fn shape(&self) -> String {
        self.0
            .split('/')
            .map(|s| if s.starts_with('{') { "{}" } else { s })
            .collect::<Vec<_>>()
            .join("/")
            .to_ascii_lowercase()
    }

    /// Substitutes parameters; unknown parameters are left as-is.
    pub fn expand(&self, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.0.len() + 8);
        for segment in self.0.split('/') {
            out.push('/');
            let param = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map(|p| p.trim_start_matches('*'));
            match param.and_then(|p| values.iter().find(|(k, _)| *k == p)) {
                Some((_, v)) => out.push_str(v),
                None => out.push_str(segment),
            }
        }
        out
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outward view of a configured route, for routing tables and URL generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteMetadata {
    pub resource: &'static str,
    pub name: String,
    pub template: RouteTemplate,
    #[serde(serialize_with = "serialize_verb")]
    pub verb: Verb,
    pub key_type: Option<&'static str>,
}

/// Data operation a [`DataProvider`](crate::store::DataProvider) is bound for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [Operation::Read, Operation::Create, Operation::Update, Operation::Delete];
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Operation::Read),
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(ConfigError::InvalidArgument(format!("unknown operation '{}'", other))),
        }
    }
}

fn serialize_verb<S: serde::Serializer>(verb: &Verb, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(verb.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_templates() {
        assert_eq!(RouteTemplate::derived("Customer", false).as_str(), "api/Customer");
        assert_eq!(RouteTemplate::derived("Customer", true).as_str(), "api/Customer/{id}");
    }

    #[test]
    fn axum_path_conversion() {
        let t = RouteTemplate::parse("/api/Customer/{id}/Fullname").unwrap();
        assert_eq!(t.axum_path(), "/api/Customer/:id/Fullname");
        assert_eq!(t.params(), vec!["id"]);
        assert_eq!(RouteTemplate::parse("files/{*path}").unwrap().axum_path(), "/files/*path");
    }

    #[test]
    fn expand_fills_params() {
        let t = RouteTemplate::derived("Customer", true);
        assert_eq!(t.expand(&[("id", "3")]), "/api/Customer/3");
        assert_eq!(t.expand(&[]), "/api/Customer/{id}");
    }

    #[test]
    fn key_param_prefers_id() {
        let t = RouteTemplate::parse("api/{tenant}/Order/{id}").unwrap();
        assert_eq!(t.key_param(), Some("id"));
        let t = RouteTemplate::parse("api/Order/{orderNo}").unwrap();
        assert_eq!(t.key_param(), Some("orderNo"));
        assert_eq!(RouteTemplate::derived("Order", false).key_param(), None);
    }

    #[test]
    fn shape_ignores_param_names_and_case() {
        let a = RouteTemplate::parse("api/Customer/{id}").unwrap();
        let b = RouteTemplate::parse("API/customer/{key}").unwrap();
        assert_eq!(a.shape(), b.shape());
        assert_ne!(a.shape(), RouteTemplate::derived("Customer", false).shape());
    }

    #[test]
    fn operations_parse() {
        assert_eq!(" Read ".parse::<Operation>().unwrap(), Operation::Read);
        assert_eq!("DELETE".parse::<Operation>().unwrap(), Operation::Delete);
        assert!("upsert".parse::<Operation>().is_err());
    }

    #[test]
    fn rejects_bad_templates() {
        assert!(RouteTemplate::parse("").is_err());
        assert!(RouteTemplate::parse("api//x").is_err());
        assert!(RouteTemplate::parse("api/x{id}").is_err());
        assert!(RouteTemplate::parse("api/{}").is_err());
        assert!(RouteTemplate::parse("api/{{id}}").is_err());
        assert!(RouteOptions::named("  ").check().is_err());
        assert!(RouteOptions::named("Full").template("api/{id}/Full").check().is_ok());
    }

    #[test]
    fn catch_all_only_as_last_segment() {
        assert!(RouteTemplate::parse("files/{*path}").is_ok());
        assert!(matches!(
            RouteTemplate::parse("files/{*path}/meta"),
            Err(ConfigError::InvalidArgument(_))
        ));
        assert!(matches!(RouteTemplate::parse("files/{*}"), Err(ConfigError::InvalidArgument(_))));
    }

    #[test]
    fn wildcard_and_colon_outside_braces_rejected() {
        assert!(matches!(RouteTemplate::parse("api/a*b"), Err(ConfigError::InvalidArgument(_))));
        assert!(matches!(RouteTemplate::parse("api/:id"), Err(ConfigError::InvalidArgument(_))));
        assert!(matches!(RouteTemplate::parse("api/*"), Err(ConfigError::InvalidArgument(_))));
        assert!(matches!(RouteTemplate::parse("api/{a:b}"), Err(ConfigError::InvalidArgument(_))));
    }
}
