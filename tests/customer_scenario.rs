//! The Customer sample end to end, through the mounted router.

mod common;

use axum::http::{header, StatusCode};
use axum::Router;
use common::{json, seed, send, Customer};
use fluent_rest::{app, Binder, DataProvider, InMemoryStore, Operation, RouteOptions, Settings};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn customer_app() -> (Router, Arc<InMemoryStore<Customer>>) {
    let store = Arc::new(InMemoryStore::seeded(seed()));
    let mut binder = Binder::new();
    binder.bind_provider::<Customer, _>(store.clone(), &Operation::ALL).unwrap();
    let fullname = store.clone();
    binder
        .on_get_by_id_with::<Customer>(
            RouteOptions::named("GetFullNameFromCustomer").template("api/Customer/{id}/Fullname"),
        )
        .unwrap()
        .reply_with_id_async(move |reply, id| {
            let store = fullname.clone();
            async move {
                Ok(match store.get(&id).await? {
                    Some(c) => reply.ok(json!({ "fullName": format!("{} {}", c.first_name, c.last_name) })),
                    None => reply.not_found(),
                })
            }
        });
    binder.validate().unwrap();
    let registry = binder.build().unwrap();
    (app(&registry, &Settings::default()), store)
}

#[tokio::test]
async fn get_collection_lists_seed() {
    let (app, _) = customer_app();
    let response = send(&app, "GET", "/api/Customer", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["lastName"], "Seagal");
}

#[tokio::test]
async fn get_by_id() {
    let (app, _) = customer_app();
    let response = send(&app, "GET", "/api/Customer/1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, json!({"id": 1, "firstName": "Chuck", "lastName": "Norris"}));

    let response = send(&app, "GET", "/api/Customer/99", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let (app, _) = customer_app();
    let response = send(&app, "GET", "/api/Customer/abc", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_creates_at_item_route() {
    let (app, store) = customer_app();
    let response = send(
        &app,
        "POST",
        "/api/Customer",
        Some(json!({"id": 3, "firstName": "Wesley", "lastName": "Cabus"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/api/Customer/3");
    assert_eq!(json(response).await["firstName"], "Wesley");

    let response = send(&app, "GET", "/api/Customer", None).await;
    assert_eq!(json(response).await.as_array().unwrap().len(), 3);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn post_invalid_model_is_rejected() {
    let (app, store) = customer_app();
    let response = send(
        &app,
        "POST",
        "/api/Customer",
        Some(json!({"id": 4, "firstName": " ", "lastName": "Nobody"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(response).await;
    assert_eq!(body["error"]["details"][0]["field"], "firstName");
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn put_updates_existing_only() {
    let (app, store) = customer_app();
    let response = send(
        &app,
        "PUT",
        "/api/Customer/2",
        Some(json!({"id": 2, "firstName": "Steven", "lastName": "Segal"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.get(&2).await.unwrap().unwrap().last_name, "Segal");

    let response = send(
        &app,
        "PUT",
        "/api/Customer/77",
        Some(json!({"id": 77, "firstName": "Ghost", "lastName": "Rider"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(store.get(&77).await.unwrap().is_none());
}

/// Reads from the seeded store; PUT only counts calls.
fn counting_put_app() -> (Router, Arc<AtomicUsize>) {
    let store = Arc::new(InMemoryStore::seeded(seed()));
    let updates = Arc::new(AtomicUsize::new(0));
    let mut binder = Binder::new();
    binder.bind_provider::<Customer, _>(store, &[Operation::Read]).unwrap();
    let counter = updates.clone();
    binder.on_put::<Customer>().unwrap().update_using(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let registry = binder.build().unwrap();
    (app(&registry, &Settings::default()), updates)
}

#[tokio::test]
async fn put_invalid_model_never_reaches_updater() {
    let (app, updates) = counting_put_app();
    let response = send(
        &app,
        "PUT",
        "/api/Customer/1",
        Some(json!({"id": 1, "firstName": " ", "lastName": "Norris"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"][0]["field"], "firstName");
    assert_eq!(updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn put_on_missing_id_never_reaches_updater() {
    let (app, updates) = counting_put_app();
    let response = send(
        &app,
        "PUT",
        "/api/Customer/77",
        Some(json!({"id": 77, "firstName": "Ghost", "lastName": "Rider"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "PUT", "/api/Customer/77", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(updates.load(Ordering::SeqCst), 0);

    let response = send(
        &app,
        "PUT",
        "/api/Customer/1",
        Some(json!({"id": 1, "firstName": "Carlos", "lastName": "Norris"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn delete_returns_no_content() {
    let (app, store) = customer_app();
    let response = send(&app, "DELETE", "/api/Customer/1", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(json(response).await, serde_json::Value::Null);
    assert_eq!(store.len(), 1);

    let response = send(&app, "DELETE", "/api/Customer/1", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fullname_endpoint() {
    let (app, _) = customer_app();
    let response = send(&app, "GET", "/api/Customer/2/Fullname", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, json!({"fullName": "Steven Seagal"}));

    let response = send(&app, "GET", "/api/Customer/42/Fullname", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unregistered_verb_is_405_with_allow() {
    let (app, _) = customer_app();
    let response = send(&app, "PATCH", "/api/Customer/1", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers().get(header::ALLOW).unwrap(),
        "GET, POST, PUT, DELETE"
    );
}

#[tokio::test]
async fn options_reports_enabled_verbs() {
    let (app, _) = customer_app();
    let response = send(&app, "OPTIONS", "/api/Customer", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
        "GET, POST, PUT, DELETE"
    );
}

#[tokio::test]
async fn health_and_version() {
    let (app, _) = customer_app();
    let response = send(&app, "GET", "/health", None).await;
    assert_eq!(json(response).await, json!({"status": "ok"}));
    let response = send(&app, "GET", "/version", None).await;
    assert_eq!(json(response).await["name"], "fluent-rest");
}
