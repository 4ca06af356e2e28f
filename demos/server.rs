//! Demo server: a Customer resource backed by an in-memory store, plus a computed Fullname endpoint.

use fluent_rest::{app, ApiModel, Binder, DataProvider, InMemoryStore, Operation, RouteOptions, Settings, ValidationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Customer {
    id: i32,
    first_name: String,
    last_name: String,
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
        if self.last_name.trim().is_empty() {
            result.push("lastName", "lastName is required");
        }
        result
    }
}

fn seed() -> Vec<Customer> {
    vec![
        Customer {
            id: 1,
            first_name: "Chuck".into(),
            last_name: "Norris".into(),
        },
        Customer {
            id: 2,
            first_name: "Steven".into(),
            last_name: "Seagal".into(),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fluent_rest=info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    settings.log_startup();

    let store = Arc::new(InMemoryStore::seeded(seed()));
    let mut binder = Binder::new();

    // GET, GET by id, POST, PUT and DELETE on api/Customer
    binder.bind_provider::<Customer, _>(store.clone(), &Operation::ALL)?;

    // GET api/Customer/{id}/Fullname
    let fullname_store = store.clone();
    binder
        .on_get_by_id_with::<Customer>(
            RouteOptions::named("GetFullNameFromCustomer").template("api/Customer/{id}/Fullname"),
        )?
        .reply_with_id_async(move |reply, id| {
            let store = fullname_store.clone();
            async move {
                Ok(match store.get(&id).await? {
                    Some(c) => reply.ok(serde_json::json!({ "fullName": format!("{} {}", c.first_name, c.last_name) })),
                    None => reply.not_found(),
                })
            }
        });

    binder.validate()?;
    let registry = binder.build()?;
    for route in registry.routes() {
        tracing::info!(name = %route.name, verb = %route.verb, template = %route.template, "route");
    }

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(&registry, &settings)).await?;
    Ok(())
}
