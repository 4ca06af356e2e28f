//! Fluent REST: declare typed REST routes per resource in code and serve them with axum.

pub mod binder;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod registry;
pub mod response;
pub mod route;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod verb;

pub use binder::Binder;
pub use config::{Operation, RouteMetadata, RouteOptions, RouteTemplate, Settings};
pub use error::{AppError, ConfigError};
pub use model::ApiModel;
pub use registry::{ApiRegistry, RouteRegistry};
pub use response::Responder;
pub use route::Route;
pub use routes::{app, app_with_state, common_routes, resource_routes};
pub use service::{
    ExceptionContext, ExceptionLogger, FieldError, ModelValidator, RuleValidator, ValidationResult, ValidationRule,
};
pub use state::AppState;
pub use store::{DataProvider, InMemoryStore};
pub use verb::Verb;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::ApiModel;
    use crate::service::ValidationResult;
    use axum::response::Response;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Customer {
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
    }

    impl Customer {
        pub fn new(id: i32, first_name: &str, last_name: &str) -> Self {
            Customer {
                id,
                first_name: first_name.into(),
                last_name: last_name.into(),
            }
        }
    }

    impl ApiModel for Customer {
        type Key = i32;
        const RESOURCE: &'static str = "Customer";

        fn key(&self) -> i32 {
            self.id
        }

        fn validate(&self) -> ValidationResult {
            let mut result = ValidationResult::valid();
            if self.first_name.trim().is_empty() {
                result.push("firstName", "firstName is required");
            }
            result
        }
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        if bytes.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_slice(&bytes).unwrap()
    }
}
