#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use fluent_rest::{ApiModel, ValidationResult};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

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

pub fn seed() -> Vec<Customer> {
    vec![Customer::new(1, "Chuck", "Norris"), Customer::new(2, "Steven", "Seagal")]
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &'static str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
