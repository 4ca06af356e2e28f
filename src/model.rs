//! Resource types served by the API.

use crate::service::ValidationResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// A resource type that routes can be bound to.
///
/// `RESOURCE` is the tag used in derived route names and templates (`api/{RESOURCE}`),
/// `Key` is the identifier type decoded from the `{id}` path segment.
pub trait ApiModel: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Key: FromStr + Display + PartialEq + Clone + Send + Sync + 'static;

    const RESOURCE: &'static str;

    fn key(&self) -> Self::Key;

    /// Model-level validation run before create and update when no validator is configured.
    fn validate(&self) -> ValidationResult {
        ValidationResult::valid()
    }
}

/// Short name of a key type for derived route names, e.g. `i32` or `Uuid`.
pub fn key_type_name<K>() -> &'static str {
    let full = std::any::type_name::<K>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
